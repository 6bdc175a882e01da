use crate::config::session::SessionUser;
use crate::model::forms::{GameListQuery, LoginForm, PlayerForm, PlayerListQuery, SqlRunForm};
use crate::service::admin::{sql_page_service, sql_run_service};
use crate::service::auth::{login_page_service, login_submit_service, logout_service};
use crate::service::dashboard::dashboard_service;
use crate::service::games::{game_detail_service, list_games_service};
use crate::service::players::{
    create_player_service, edit_player_form_service, list_players_service, new_player_form_service,
    player_detail_service, update_player_service,
};
use crate::util::render;
use crate::AppState;
use actix_web::web::{Data, Form, Path, Query};
use actix_web::{get, post, web, HttpRequest, Responder};

#[get("/")]
async fn index_handler(session: Option<SessionUser>) -> impl Responder {
    if session.is_some() {
        render::see_other("/dashboard")
    } else {
        render::see_other("/login")
    }
}

#[get("/login")]
async fn login_page_handler(req: HttpRequest, session: Option<SessionUser>) -> impl Responder {
    login_page_service(req, session).await
}

#[post("/login")]
async fn login_submit_handler(
    req: HttpRequest,
    data: Data<AppState>,
    form: Form<LoginForm>,
) -> impl Responder {
    login_submit_service(req, data, form.into_inner()).await
}

#[get("/logout")]
async fn logout_handler() -> impl Responder {
    logout_service().await
}

#[get("/dashboard")]
async fn dashboard_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
) -> impl Responder {
    dashboard_service(req, session, data).await
}

#[get("/players")]
async fn players_list_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    query: Query<PlayerListQuery>,
) -> impl Responder {
    list_players_service(req, session, data, query.into_inner()).await
}

#[get("/players/new")]
async fn player_new_form_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
) -> impl Responder {
    new_player_form_service(req, session, data).await
}

#[post("/players/new")]
async fn player_create_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    form: Form<PlayerForm>,
) -> impl Responder {
    create_player_service(req, session, data, form.into_inner()).await
}

#[get("/players/{id}")]
async fn player_detail_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    path: Path<i32>,
) -> impl Responder {
    player_detail_service(req, session, data, path.into_inner()).await
}

#[get("/players/{id}/edit")]
async fn player_edit_form_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    path: Path<i32>,
) -> impl Responder {
    edit_player_form_service(req, session, data, path.into_inner()).await
}

#[post("/players/{id}/edit")]
async fn player_update_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    path: Path<i32>,
    form: Form<PlayerForm>,
) -> impl Responder {
    update_player_service(req, session, data, path.into_inner(), form.into_inner()).await
}

#[get("/games")]
async fn games_list_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    query: Query<GameListQuery>,
) -> impl Responder {
    list_games_service(req, session, data, query.into_inner()).await
}

#[get("/games/{id}")]
async fn game_detail_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    path: Path<i32>,
) -> impl Responder {
    game_detail_service(req, session, data, path.into_inner()).await
}

#[get("/admin/sql")]
async fn admin_sql_page_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
) -> impl Responder {
    sql_page_service(req, session, data).await
}

#[post("/admin/sql")]
async fn admin_sql_run_handler(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    form: Form<SqlRunForm>,
) -> impl Responder {
    sql_run_service(req, session, data, form.into_inner().query_key).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    // "/players/new" is registered ahead of "/players/{id}" so the literal
    // segment wins the match.
    conf.service(index_handler)
        .service(login_page_handler)
        .service(login_submit_handler)
        .service(logout_handler)
        .service(dashboard_handler)
        .service(players_list_handler)
        .service(player_new_form_handler)
        .service(player_create_handler)
        .service(player_detail_handler)
        .service(player_edit_form_handler)
        .service(player_update_handler)
        .service(games_list_handler)
        .service(game_detail_handler)
        .service(admin_sql_page_handler)
        .service(admin_sql_run_handler);
}
