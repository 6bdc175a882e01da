use crate::config::config::Config;
use crate::repository::database::Database;
use crate::repository::sql_runner::ScriptRegistry;
use crate::util::render;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder, Result};
use log::info;
use serde::Serialize;
use std::path::Path;

mod config;
mod controller;
mod model;
mod repository;
mod service;
mod util;

#[derive(Serialize)]
pub struct Response {
    status: String,
    message: String,
}

#[get("/health")]
async fn health_check() -> impl Responder {
    let response = Response {
        status: "Success".to_string(),
        message: "Everything is working as expected".to_string(),
    };
    HttpResponse::Ok().json(response)
}

async fn not_found() -> Result<HttpResponse> {
    Ok(render::not_found_page("The requested page does not exist."))
}

pub struct AppState {
    pub db: Database,
    pub scripts: ScriptRegistry,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    log4rs::init_file("./log-config.yml", Default::default()).expect("Log config file not found.");
    let config = Config::init();
    let db = Database::new(&config);
    let scripts = ScriptRegistry::load(Path::new("./sql/views"), Path::new("./sql/scripts"));
    let bind_addr = config.bind_addr.clone();
    let app_data = web::Data::new(AppState {
        db,
        scripts,
        config,
    });

    info!("listening on {bind_addr}");
    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(controller::handler::config)
            .service(health_check)
            .default_service(web::route().to(not_found))
            .wrap(actix_web::middleware::Logger::default())
    })
    .bind(bind_addr)?
    .run()
    .await
}
