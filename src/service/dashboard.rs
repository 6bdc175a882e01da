use crate::config::session::SessionUser;
use crate::repository::database::{DataError, Database};
use crate::service::stats;
use crate::util::render;
use crate::AppState;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use chrono::Utc;
use log::error;

pub async fn dashboard_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
) -> HttpResponse {
    match dashboard_content(&data.db).await {
        Ok(body) => render::page(&req, "Dashboard", "dashboard", &session, &body),
        Err(err) => {
            error!("could not build the dashboard: {err}");
            render::error_page("Could not load the dashboard.")
        }
    }
}

/// Everything on the dashboard is recomputed from raw rows on each request;
/// there are no stored totals to drift out of date.
async fn dashboard_content(db: &Database) -> Result<String, DataError> {
    let counts = db.dashboard_counts().await?;
    let scoring = db.scoring_rows().await?;
    let leaders = stats::leaderboard(&scoring, 5);
    let performances = stats::top_performances(&db.performance_rows().await?, 5);
    let upcoming = db.upcoming_games(Utc::now().date_naive(), 5).await?;
    let citizenship = stats::distribution(db.citizenship_values().await?);

    let tiles = format!(
        "<div class=\"tiles\">\
         <div class=\"tile\"><span class=\"num\">{}</span>Players</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Clubs</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Games</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Leagues</div>\
         </div>",
        counts.players, counts.clubs, counts.games, counts.leagues
    );

    let leader_rows: Vec<Vec<String>> = leaders
        .iter()
        .map(|entry| {
            vec![
                format!(
                    "<a href=\"/players/{}\">{}</a>",
                    entry.player_id,
                    render::escape(&entry.player_name)
                ),
                entry.total_points.to_string(),
            ]
        })
        .collect();

    let performance_rows: Vec<Vec<String>> = performances
        .iter()
        .map(|performance| {
            vec![
                render::escape(&performance.player_name),
                render::escape(&performance.game_code),
                performance.game_date.to_string(),
                performance.points.to_string(),
            ]
        })
        .collect();

    let upcoming_rows: Vec<Vec<String>> = upcoming
        .iter()
        .map(|game| {
            vec![
                format!(
                    "<a href=\"/games/{}\">{}</a>",
                    game.id,
                    render::escape(&game.code)
                ),
                game.game_date.to_string(),
                render::escape(&game.location),
                render::escape(&game.game_type),
            ]
        })
        .collect();

    Ok(format!(
        "<h1>Dashboard</h1>{tiles}\
         <h2>Career scoring leaders</h2>{}\
         <h2>Top single-game performances</h2>{}\
         <h2>Upcoming games</h2>{}\
         <h2>Players by citizenship</h2>{}",
        render::table(&["Player", "Total points"], &leader_rows),
        render::table(&["Player", "Game", "Date", "Points"], &performance_rows),
        render::table(&["Game", "Date", "Location", "Type"], &upcoming_rows),
        render::bar_chart(&citizenship),
    ))
}
