use crate::config::session::{SessionUser, SESSION_COOKIE};
use crate::model::auth;
use crate::model::forms::LoginForm;
use crate::util::flash::{self, FlashMessage};
use crate::util::{render, token};
use crate::AppState;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use log::{error, info, warn};
use validator::Validate;

pub async fn login_page_service(req: HttpRequest, session: Option<SessionUser>) -> HttpResponse {
    if session.is_some() {
        return render::see_other("/dashboard");
    }
    render_login(&req, None)
}

pub async fn login_submit_service(
    req: HttpRequest,
    data: Data<AppState>,
    form: LoginForm,
) -> HttpResponse {
    if form.validate().is_err() {
        return render_login(&req, Some("Username and password are required."));
    }

    let username = form.username.trim().to_ascii_lowercase();
    let Some(role) = auth::authenticate(&username, &form.password) else {
        warn!("failed login attempt for '{username}'");
        return render_login(&req, Some("Invalid credentials."));
    };

    match token::issue_session_token(
        &username,
        role,
        &data.config.secret_key,
        data.config.session_max_age,
    ) {
        Ok(signed) => {
            info!("{username} signed in as {role}");
            let session_cookie = Cookie::build(SESSION_COOKIE, signed)
                .path("/")
                .max_age(CookieDuration::new(data.config.session_max_age, 0))
                .http_only(true)
                .finish();
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/dashboard"))
                .cookie(session_cookie)
                .cookie(flash::cookie(&FlashMessage::info("Signed in")))
                .finish()
        }
        Err(err) => {
            error!("could not issue a session token for '{username}': {err}");
            render_login(&req, Some("Could not establish a session, try again."))
        }
    }
}

pub async fn logout_service() -> HttpResponse {
    let expired = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .max_age(CookieDuration::ZERO)
        .http_only(true)
        .finish();
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/login"))
        .cookie(expired)
        .finish()
}

fn render_login(req: &HttpRequest, error: Option<&str>) -> HttpResponse {
    let banner = error
        .map(|message| format!("<div class=\"flash flash-error\">{}</div>", render::escape(message)))
        .unwrap_or_default();
    let body = format!(
        "<h1>Courtside sign in</h1>{banner}\
         <form method=\"post\" action=\"/login\" class=\"form-grid\">\
         <label for=\"username\">Username</label>\
         <input id=\"username\" name=\"username\" autofocus>\
         <label for=\"password\">Password</label>\
         <input id=\"password\" name=\"password\" type=\"password\">\
         <span></span><button type=\"submit\">Sign in</button>\
         </form>"
    );
    render::bare_page(req, "Sign in", &body)
}
