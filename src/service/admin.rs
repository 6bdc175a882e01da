use crate::config::session::{require_role, SessionUser};
use crate::model::auth::Role;
use crate::repository::sql_runner::{self, RunOutcome};
use crate::util::flash::{self, FlashMessage};
use crate::util::render;
use crate::AppState;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse};
use log::error;

pub async fn sql_page_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
) -> HttpResponse {
    if let Err(denied) = require_role(&session, &[Role::Admin]) {
        return denied;
    }
    let body = format!("<h1>Admin SQL</h1>{}", menu(&data));
    render::page(&req, "Admin SQL", "admin", &session, &body)
}

pub async fn sql_run_service(
    req: HttpRequest,
    session: SessionUser,
    data: Data<AppState>,
    query_key: String,
) -> HttpResponse {
    if let Err(denied) = require_role(&session, &[Role::Admin]) {
        return denied;
    }

    let Some(script) = data.scripts.get(&query_key) else {
        return flash::redirect_with_flash(
            "/admin/sql",
            FlashMessage::error(format!("No registered script named '{query_key}'.")),
        );
    };

    let result =
        sql_runner::run_script(&data.config.database_url, script, data.config.sql_echo).await;
    let section = match result {
        Ok(outcome) => outcome_section(&script.key, &outcome),
        Err(err) => {
            error!("admin script '{}' failed: {err}", script.key);
            // The raw driver message is intentional; this page is a debugging
            // tool restricted to the admin role.
            format!(
                "<h2>Result of '{}'</h2><p class=\"error-text\">{}</p>",
                render::escape(&script.key),
                render::escape(&err.to_string())
            )
        }
    };

    let body = format!("<h1>Admin SQL</h1>{}{section}", menu(&data));
    render::page(&req, "Admin SQL", "admin", &session, &body)
}

fn menu(data: &Data<AppState>) -> String {
    if data.scripts.is_empty() {
        return "<p class=\"empty\">No scripts registered.</p>".to_string();
    }
    let rows: Vec<Vec<String>> = data
        .scripts
        .iter()
        .map(|script| {
            vec![
                render::escape(&script.key),
                script.kind_label().to_string(),
            ]
        })
        .collect();
    let options: String = data
        .scripts
        .iter()
        .map(|script| render::option_tag(&script.key, &script.key, None))
        .collect();
    format!(
        "{}<form method=\"post\" action=\"/admin/sql\" class=\"filters\">\
         <label>Script<select name=\"query_key\">{options}</select></label>\
         <button type=\"submit\">Run</button></form>",
        render::table(&["Script", "Kind"], &rows)
    )
}

fn outcome_section(key: &str, outcome: &RunOutcome) -> String {
    let heading = format!("<h2>Result of '{}'</h2>", render::escape(key));
    if !outcome.has_rows() {
        return format!(
            "{heading}<div class=\"flash flash-info\">Executed successfully ({} rows affected).</div>",
            outcome.affected
        );
    }
    let headers: Vec<&str> = outcome.columns.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = outcome
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| render::escape(cell)).collect())
        .collect();
    format!("{heading}{}", render::table(&headers, &rows))
}

#[cfg(test)]
mod tests {
    use super::outcome_section;
    use crate::repository::sql_runner::RunOutcome;

    #[test]
    fn row_results_render_as_a_grid() {
        let outcome = RunOutcome {
            columns: vec!["country".to_string(), "total".to_string()],
            rows: vec![vec!["Serbia".to_string(), "412".to_string()]],
            affected: 0,
        };
        let section = outcome_section("top_national_team_scorers", &outcome);
        assert!(section.contains("<th>country</th>"));
        assert!(section.contains("<td>Serbia</td>"));
    }

    #[test]
    fn rowless_results_report_silent_success() {
        let outcome = RunOutcome {
            columns: vec![],
            rows: vec![],
            affected: 7,
        };
        let section = outcome_section("normalize_participant_roles", &outcome);
        assert!(section.contains("Executed successfully (7 rows affected)"));
    }
}
