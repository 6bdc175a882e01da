use crate::model::auth::{Permissions, Role};
use crate::util::flash::{self, FlashMessage};
use crate::util::token;
use crate::AppState;
use actix_web::http::{header, StatusCode};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use log::warn;
use std::fmt;
use std::future::{ready, Ready};

pub const SESSION_COOKIE: &str = "session";

/// The verified identity behind a request, decoded from the signed session
/// cookie. Handlers that take this extractor are reachable only with a valid
/// session; everything else bounces to the login page.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    pub fn permissions(&self) -> Permissions {
        self.role.permissions()
    }
}

/// Extractor failure: not an error page but a redirect to `/login`.
#[derive(Debug)]
pub struct AuthRedirect;

impl fmt::Display for AuthRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("authentication required")
    }
}

impl ResponseError for AuthRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/login"))
            .finish()
    }
}

impl FromRequest for SessionUser {
    type Error = AuthRedirect;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(data) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AuthRedirect));
        };
        let Some(cookie) = req.cookie(SESSION_COOKIE) else {
            return ready(Err(AuthRedirect));
        };

        match token::verify_session_token(&data.config.secret_key, cookie.value()) {
            Ok(claims) => ready(Ok(SessionUser {
                username: claims.sub,
                role: claims.role,
            })),
            Err(err) => {
                warn!("rejecting session cookie: {err}");
                ready(Err(AuthRedirect))
            }
        }
    }
}

/// Soft deny: an authenticated user outside the accepted roles is sent back to
/// the dashboard with a warning flash, never a hard error. Authorization runs
/// only here at the handler boundary; the repository performs no re-checks.
pub fn require_role(session: &SessionUser, accepted: &[Role]) -> Result<(), HttpResponse> {
    if accepted.contains(&session.role) {
        return Ok(());
    }
    warn!(
        "{} ({}) denied an action requiring one of {:?}",
        session.username, session.role, accepted
    );
    Err(flash::redirect_with_flash(
        "/dashboard",
        FlashMessage::error("You do not have the required permissions for this action."),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    fn session(role: Role) -> SessionUser {
        SessionUser {
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn accepted_roles_pass() {
        assert!(require_role(&session(Role::Admin), &[Role::Admin, Role::Staff]).is_ok());
        assert!(require_role(&session(Role::Staff), &[Role::Admin, Role::Staff]).is_ok());
    }

    #[test]
    fn denied_roles_bounce_to_the_dashboard() {
        let denied = require_role(&session(Role::Viewer), &[Role::Admin, Role::Staff]).unwrap_err();
        assert_eq!(denied.status(), StatusCode::SEE_OTHER);
        let location = denied.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/dashboard");
    }

    #[test]
    fn auth_redirect_points_at_login() {
        let response = AuthRedirect.error_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }
}
