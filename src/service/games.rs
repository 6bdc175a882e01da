use crate::config::session::SessionUser;
use crate::model::entities::Game;
use crate::model::forms::GameListQuery;
use crate::repository::database::{DataError, Database};
use crate::service::participants::{self, ResolvedParticipant};
use crate::service::stats;
use crate::util::render;
use crate::AppState;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use log::error;

pub async fn list_games_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    query: GameListQuery,
) -> HttpResponse {
    match list_content(&data.db, &query).await {
        Ok(body) => render::page(&req, "Games", "games", &session, &body),
        Err(err) => {
            error!("could not build the game list: {err}");
            render::error_page("Could not load the game list.")
        }
    }
}

async fn list_content(db: &Database, query: &GameListQuery) -> Result<String, DataError> {
    let filters = query.filters();
    let games = db.list_games(&filters).await?;
    let game_ids: Vec<i32> = games.iter().map(|(game, _, _)| game.id).collect();
    let mut participants_by_game = participants::resolve_for_games(db, &game_ids).await?;
    let leagues = db.list_leagues().await?;
    let seasons = db.distinct_seasons().await?;
    let game_types = db.distinct_game_types().await?;

    let league_options: String = leagues
        .iter()
        .map(|league| {
            render::option_tag(
                &league.id.to_string(),
                &league.name,
                filters.league_id.map(|id| id.to_string()).as_deref(),
            )
        })
        .collect();
    let season_options: String = seasons
        .iter()
        .map(|value| render::option_tag(value, value, filters.season_contains.as_deref()))
        .collect();
    let type_options: String = game_types
        .iter()
        .map(|value| render::option_tag(value, value, filters.type_contains.as_deref()))
        .collect();

    let filter_form = format!(
        "<form method=\"get\" action=\"/games\" class=\"filters\">\
         <label>Season<select name=\"season\"><option value=\"\">All</option>{season_options}</select></label>\
         <label>Type<select name=\"type\"><option value=\"\">All</option>{type_options}</select></label>\
         <label>League<select name=\"league\"><option value=\"\">All</option>{league_options}</select></label>\
         <button type=\"submit\">Filter</button></form>"
    );

    let rows: Vec<Vec<String>> = games
        .iter()
        .map(|(game, league_name, championship_name)| {
            let resolved = participants_by_game.remove(&game.id).unwrap_or_default();
            vec![
                format!(
                    "<a href=\"/games/{}\">{}</a>",
                    game.id,
                    render::escape(&game.code)
                ),
                game.game_date.to_string(),
                competition_label(league_name.as_deref(), championship_name.as_deref()),
                render::escape(game.season.as_deref().unwrap_or("")),
                render::escape(&game.game_type),
                render::escape(&game.location),
                matchup_summary(&resolved),
            ]
        })
        .collect();

    Ok(format!(
        "<h1>Games</h1>{filter_form}{}",
        render::table(
            &["Game", "Date", "Competition", "Season", "Type", "Location", "Matchup"],
            &rows
        )
    ))
}

pub async fn game_detail_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    id: i32,
) -> HttpResponse {
    let found = match data.db.find_game(id).await {
        Ok(found) => found,
        Err(err) => {
            error!("could not load game {id}: {err}");
            return render::error_page("Could not load the game.");
        }
    };
    let Some((game, league_name, championship_name)) = found else {
        return render::not_found_page("No game with that id.");
    };

    match detail_content(&data.db, &game, league_name.as_deref(), championship_name.as_deref())
        .await
    {
        Ok(body) => render::page(&req, &game.code, "games", &session, &body),
        Err(err) => {
            error!("could not build the page for game {id}: {err}");
            render::error_page("Could not load the game.")
        }
    }
}

async fn detail_content(
    db: &Database,
    game: &Game,
    league_name: Option<&str>,
    championship_name: Option<&str>,
) -> Result<String, DataError> {
    let mut participants_by_game = participants::resolve_for_games(db, &[game.id]).await?;
    let resolved = participants_by_game.remove(&game.id).unwrap_or_default();
    let box_score = db.game_box_score(game.id).await?;

    let facts = format!(
        "<table><tbody>\
         <tr><th>Date</th><td>{}</td></tr>\
         <tr><th>Location</th><td>{}</td></tr>\
         <tr><th>Type</th><td>{}</td></tr>\
         <tr><th>Season</th><td>{}</td></tr>\
         <tr><th>Competition</th><td>{}</td></tr>\
         </tbody></table>",
        game.game_date,
        render::escape(&game.location),
        render::escape(&game.game_type),
        render::escape(game.season.as_deref().unwrap_or("")),
        competition_label(league_name, championship_name),
    );

    let participant_rows: Vec<Vec<String>> = resolved
        .iter()
        .map(|participant| {
            vec![
                render::escape(&participant.display_name),
                render::escape(participant.role.as_deref().unwrap_or("")),
                participant.score.to_string(),
            ]
        })
        .collect();

    let box_score_rows: Vec<Vec<String>> = box_score
        .iter()
        .map(|(player, line)| {
            vec![
                format!(
                    "<a href=\"/players/{}\">{}</a>",
                    player.id,
                    render::escape(&player.name)
                ),
                format!("{}/{}", line.two_pt_made, line.two_pt_attempted),
                format!("{}/{}", line.three_pt_made, line.three_pt_attempted),
                format!("{}/{}", line.ft_made, line.ft_attempted),
                line.rebounds.to_string(),
                line.assists.to_string(),
                line.blocks.to_string(),
                stats::game_points(line).to_string(),
            ]
        })
        .collect();

    Ok(format!(
        "<h1>{}</h1>{facts}<h2>Participants</h2>{}<h2>Box score</h2>{}",
        render::escape(&game.code),
        render::table(&["Participant", "Role", "Score"], &participant_rows),
        render::table(
            &["Player", "2P", "3P", "FT", "Reb", "Ast", "Blk", "Points"],
            &box_score_rows
        )
    ))
}

fn competition_label(league_name: Option<&str>, championship_name: Option<&str>) -> String {
    match (league_name, championship_name) {
        (Some(league), _) => render::escape(league),
        (None, Some(championship)) => render::escape(championship),
        (None, None) => String::new(),
    }
}

/// One-line "Home 82 : 75 Away" style summary; participants beyond the usual
/// two are appended in turn.
fn matchup_summary(participants: &[ResolvedParticipant]) -> String {
    if participants.is_empty() {
        return String::new();
    }
    participants
        .iter()
        .map(|participant| {
            format!(
                "{} {}",
                render::escape(&participant.display_name),
                participant.score
            )
        })
        .collect::<Vec<_>>()
        .join(" : ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entities::ParticipantRef;

    fn resolved(name: &str, score: i32) -> ResolvedParticipant {
        ResolvedParticipant {
            reference: ParticipantRef::Club(1),
            display_name: name.to_string(),
            score,
            role: None,
        }
    }

    #[test]
    fn matchup_joins_names_and_scores() {
        let summary = matchup_summary(&[resolved("Partizan", 82), resolved("Selection #9", 75)]);
        assert_eq!(summary, "Partizan 82 : Selection #9 75");
        assert_eq!(matchup_summary(&[]), "");
    }

    #[test]
    fn competition_prefers_the_league_name() {
        assert_eq!(competition_label(Some("ABA League"), Some("EuroBasket")), "ABA League");
        assert_eq!(competition_label(None, Some("EuroBasket")), "EuroBasket");
        assert_eq!(competition_label(None, None), "");
    }
}
