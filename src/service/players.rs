use crate::config::session::{require_role, SessionUser};
use crate::model::auth::Role;
use crate::model::entities::{Club, Player};
use crate::model::forms::{PlayerForm, PlayerListQuery};
use crate::repository::database::{DataError, Database};
use crate::service::stats::{self, CareerTotals};
use crate::util::flash::{self, FlashMessage};
use crate::util::render;
use crate::AppState;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use log::error;

const EDIT_ROLES: &[Role] = &[Role::Admin, Role::Staff];

pub async fn list_players_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    query: PlayerListQuery,
) -> HttpResponse {
    match list_content(&data.db, &session, &query).await {
        Ok(body) => render::page(&req, "Players", "players", &session, &body),
        Err(err) => {
            error!("could not build the player list: {err}");
            render::error_page("Could not load the player list.")
        }
    }
}

async fn list_content(
    db: &Database,
    session: &SessionUser,
    query: &PlayerListQuery,
) -> Result<String, DataError> {
    let filters = query.filters();
    let players = db.list_players(&filters).await?;
    let clubs = db.list_clubs().await?;
    let citizenships = db.distinct_citizenships().await?;
    let confederations = db.distinct_confederations().await?;

    let new_button = if session.permissions().can_edit_players {
        "<p><a href=\"/players/new\"><button type=\"button\">New player</button></a></p>"
    } else {
        ""
    };

    let club_options: String = clubs
        .iter()
        .map(|club| {
            render::option_tag(
                &club.id.to_string(),
                &club.name,
                filters.club_id.map(|id| id.to_string()).as_deref(),
            )
        })
        .collect();
    let citizenship_options: String = citizenships
        .iter()
        .map(|value| render::option_tag(value, value, filters.citizenship.as_deref()))
        .collect();
    let confederation_options: String = confederations
        .iter()
        .map(|value| render::option_tag(value, value, filters.continent.as_deref()))
        .collect();

    let filter_form = format!(
        "<form method=\"get\" action=\"/players\" class=\"filters\">\
         <label>Name<input name=\"q\" value=\"{}\"></label>\
         <label>Club<select name=\"club\"><option value=\"\">All</option>{club_options}</select></label>\
         <label>Citizenship<select name=\"citizenship\"><option value=\"\">All</option>{citizenship_options}</select></label>\
         <label>Continent<select name=\"continent\"><option value=\"\">All</option>{confederation_options}</select></label>\
         <button type=\"submit\">Filter</button></form>",
        render::escape(filters.name_contains.as_deref().unwrap_or(""))
    );

    let rows: Vec<Vec<String>> = players
        .iter()
        .map(|(player, club_name)| {
            vec![
                format!(
                    "<a href=\"/players/{}\">{}</a>",
                    player.id,
                    render::escape(&player.name)
                ),
                render::escape(&player.code),
                player.date_of_birth.to_string(),
                player
                    .height
                    .map(|height| format!("{height:.2}"))
                    .unwrap_or_default(),
                render::escape(player.citizenship.as_deref().unwrap_or("")),
                render::escape(club_name.as_deref().unwrap_or("")),
            ]
        })
        .collect();

    Ok(format!(
        "<h1>Players</h1>{new_button}{filter_form}{}",
        render::table(
            &["Name", "Code", "Date of birth", "Height", "Citizenship", "Club"],
            &rows
        )
    ))
}

pub async fn player_detail_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    id: i32,
) -> HttpResponse {
    let player = match data.db.find_player(id).await {
        Ok(found) => found,
        Err(err) => {
            error!("could not load player {id}: {err}");
            return render::error_page("Could not load the player.");
        }
    };
    let Some(player) = player else {
        return render::not_found_page("No player with that id.");
    };

    match detail_content(&data.db, &session, &player).await {
        Ok(body) => render::page(&req, &player.name, "players", &session, &body),
        Err(err) => {
            error!("could not build the page for player {id}: {err}");
            render::error_page("Could not load the player.")
        }
    }
}

async fn detail_content(
    db: &Database,
    session: &SessionUser,
    player: &Player,
) -> Result<String, DataError> {
    let club_name = match player.current_club_id {
        Some(club_id) => db.club_name(club_id).await?,
        None => None,
    };
    let game_log = db.player_game_log(player.id).await?;
    let lines: Vec<_> = game_log.iter().map(|(_, line)| *line).collect();
    let totals = CareerTotals::from_lines(&lines);

    let edit_link = if session.permissions().can_edit_players {
        format!(
            "<p><a href=\"/players/{}/edit\"><button type=\"button\">Edit</button></a></p>",
            player.id
        )
    } else {
        String::new()
    };

    let facts = format!(
        "<table><tbody>\
         <tr><th>Code</th><td>{}</td></tr>\
         <tr><th>Date of birth</th><td>{}</td></tr>\
         <tr><th>Height</th><td>{}</td></tr>\
         <tr><th>Citizenship</th><td>{}</td></tr>\
         <tr><th>Current club</th><td>{}</td></tr>\
         </tbody></table>",
        render::escape(&player.code),
        player.date_of_birth,
        player
            .height
            .map(|height| format!("{height:.2} m"))
            .unwrap_or_default(),
        render::escape(player.citizenship.as_deref().unwrap_or("")),
        render::escape(club_name.as_deref().unwrap_or("")),
    );

    let totals_tiles = format!(
        "<div class=\"tiles\">\
         <div class=\"tile\"><span class=\"num\">{}</span>Games</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Points</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Rebounds</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Assists</div>\
         <div class=\"tile\"><span class=\"num\">{}</span>Blocks</div>\
         <div class=\"tile\"><span class=\"num\">{:.1}</span>PPG</div>\
         <div class=\"tile\"><span class=\"num\">{:.1}</span>RPG</div>\
         <div class=\"tile\"><span class=\"num\">{:.1}</span>APG</div>\
         </div>",
        totals.games_played,
        totals.points,
        totals.rebounds,
        totals.assists,
        totals.blocks,
        totals.ppg,
        totals.rpg,
        totals.apg,
    );

    let log_rows: Vec<Vec<String>> = game_log
        .iter()
        .map(|(game, line)| {
            vec![
                format!(
                    "<a href=\"/games/{}\">{}</a>",
                    game.id,
                    render::escape(&game.code)
                ),
                game.game_date.to_string(),
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
        "<h1>{}</h1>{edit_link}{facts}<h2>Career</h2>{totals_tiles}<h2>Game log</h2>{}",
        render::escape(&player.name),
        render::table(
            &["Game", "Date", "2P", "3P", "FT", "Reb", "Ast", "Blk", "Points"],
            &log_rows
        )
    ))
}

pub async fn new_player_form_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
) -> HttpResponse {
    if let Err(denied) = require_role(&session, EDIT_ROLES) {
        return denied;
    }
    let clubs = match data.db.list_clubs().await {
        Ok(clubs) => clubs,
        Err(err) => {
            error!("could not load clubs for the player form: {err}");
            return render::error_page("Could not load the player form.");
        }
    };
    form_page(
        &req,
        &session,
        &clubs,
        &PlayerForm::default(),
        FormTarget::New,
        None,
    )
}

pub async fn create_player_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    form: PlayerForm,
) -> HttpResponse {
    if let Err(denied) = require_role(&session, EDIT_ROLES) {
        return denied;
    }
    let clubs = match data.db.list_clubs().await {
        Ok(clubs) => clubs,
        Err(err) => {
            error!("could not load clubs for the player form: {err}");
            return render::error_page("Could not load the player form.");
        }
    };

    // Validation failures re-render the form with the message; nothing is
    // written until the whole record parses.
    match form.validate_input() {
        Err(form_error) => form_page(
            &req,
            &session,
            &clubs,
            &form,
            FormTarget::New,
            Some(&form_error.to_string()),
        ),
        Ok(input) => match data.db.insert_player(&input.to_insert()).await {
            Ok(()) => flash::redirect_with_flash("/players", FlashMessage::info("Player saved")),
            Err(err) => {
                error!("could not insert a player: {err}");
                form_page(
                    &req,
                    &session,
                    &clubs,
                    &form,
                    FormTarget::New,
                    Some(&format!("Could not save the player ({err}).")),
                )
            }
        },
    }
}

pub async fn edit_player_form_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    id: i32,
) -> HttpResponse {
    if let Err(denied) = require_role(&session, EDIT_ROLES) {
        return denied;
    }
    let (player, clubs) = match load_edit_context(&data.db, id).await {
        Ok(Some(context)) => context,
        Ok(None) => return render::not_found_page("No player with that id."),
        Err(err) => {
            error!("could not load player {id} for editing: {err}");
            return render::error_page("Could not load the player form.");
        }
    };
    form_page(
        &req,
        &session,
        &clubs,
        &PlayerForm::from_player(&player),
        FormTarget::Edit { id },
        None,
    )
}

pub async fn update_player_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    id: i32,
    form: PlayerForm,
) -> HttpResponse {
    if let Err(denied) = require_role(&session, EDIT_ROLES) {
        return denied;
    }
    let (_, clubs) = match load_edit_context(&data.db, id).await {
        Ok(Some(context)) => context,
        Ok(None) => return render::not_found_page("No player with that id."),
        Err(err) => {
            error!("could not load player {id} for editing: {err}");
            return render::error_page("Could not load the player form.");
        }
    };

    match form.validate_input() {
        Err(form_error) => form_page(
            &req,
            &session,
            &clubs,
            &form,
            FormTarget::Edit { id },
            Some(&form_error.to_string()),
        ),
        Ok(input) => match data.db.update_player(id, &input.to_changes()).await {
            Ok(_) => flash::redirect_with_flash("/players", FlashMessage::info("Player saved")),
            Err(err) => {
                error!("could not update player {id}: {err}");
                form_page(
                    &req,
                    &session,
                    &clubs,
                    &form,
                    FormTarget::Edit { id },
                    Some(&format!("Could not save the player ({err}).")),
                )
            }
        },
    }
}

async fn load_edit_context(
    db: &Database,
    id: i32,
) -> Result<Option<(Player, Vec<Club>)>, DataError> {
    let Some(player) = db.find_player(id).await? else {
        return Ok(None);
    };
    let clubs = db.list_clubs().await?;
    Ok(Some((player, clubs)))
}

enum FormTarget {
    New,
    Edit { id: i32 },
}

impl FormTarget {
    fn title(&self) -> &'static str {
        match self {
            FormTarget::New => "New player",
            FormTarget::Edit { .. } => "Edit player",
        }
    }

    fn action(&self) -> String {
        match self {
            FormTarget::New => "/players/new".to_string(),
            FormTarget::Edit { id } => format!("/players/{id}/edit"),
        }
    }
}

fn form_page(
    req: &HttpRequest,
    session: &SessionUser,
    clubs: &[Club],
    form: &PlayerForm,
    target: FormTarget,
    error: Option<&str>,
) -> HttpResponse {
    let banner = error
        .map(|message| {
            format!(
                "<div class=\"flash flash-error\">{}</div>",
                render::escape(message)
            )
        })
        .unwrap_or_default();
    let club_options: String = clubs
        .iter()
        .map(|club| render::option_tag(&club.id.to_string(), &club.name, Some(form.club_id.trim())))
        .collect();

    let body = format!(
        "<h1>{}</h1>{banner}\
         <form method=\"post\" action=\"{}\" class=\"form-grid\">\
         <label for=\"code\">Code</label><input id=\"code\" name=\"code\" value=\"{}\">\
         <label for=\"name\">Name</label><input id=\"name\" name=\"name\" value=\"{}\">\
         <label for=\"date_of_birth\">Date of birth</label>\
         <input id=\"date_of_birth\" name=\"date_of_birth\" type=\"date\" value=\"{}\">\
         <label for=\"height\">Height (m)</label><input id=\"height\" name=\"height\" value=\"{}\">\
         <label for=\"citizenship\">Citizenship</label>\
         <input id=\"citizenship\" name=\"citizenship\" value=\"{}\">\
         <label for=\"club_id\">Current club</label>\
         <select id=\"club_id\" name=\"club_id\"><option value=\"\">None</option>{club_options}</select>\
         <span></span><button type=\"submit\">Save</button>\
         </form>",
        target.title(),
        target.action(),
        render::escape(&form.code),
        render::escape(&form.name),
        render::escape(&form.date_of_birth),
        render::escape(&form.height),
        render::escape(&form.citizenship),
    );
    render::page(req, target.title(), "players", session, &body)
}
