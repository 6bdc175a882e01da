//! Server-rendered HTML assembly. Pages are plain strings built around one
//! shared layout; table cells are raw HTML, so callers escape data values
//! with `escape` before handing them in.

use crate::config::session::SessionUser;
use crate::model::auth::Role;
use crate::util::flash::{self, FlashLevel, FlashMessage};
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1d2733; background: #f4f6f8; }
nav { display: flex; gap: 1rem; align-items: center; padding: 0.7rem 1.2rem; background: #17324d; color: #fff; }
nav a { color: #cfe0f1; text-decoration: none; }
nav a.active { color: #fff; font-weight: 600; }
nav .who { margin-left: auto; color: #9db8d2; }
main { max-width: 70rem; margin: 1.2rem auto; padding: 0 1.2rem; }
h1 { font-size: 1.4rem; }
table { border-collapse: collapse; width: 100%; background: #fff; margin: 0.8rem 0; }
th, td { border: 1px solid #d8dee5; padding: 0.4rem 0.6rem; text-align: left; font-size: 0.92rem; }
th { background: #e8edf2; }
form.filters { display: flex; gap: 0.6rem; flex-wrap: wrap; align-items: end; margin: 0.8rem 0; }
form.filters label { display: flex; flex-direction: column; font-size: 0.85rem; gap: 0.2rem; }
input, select { padding: 0.3rem 0.4rem; border: 1px solid #b9c2cc; border-radius: 3px; }
button { padding: 0.35rem 0.9rem; border: none; border-radius: 3px; background: #17324d; color: #fff; cursor: pointer; }
.flash { margin: 0.8rem auto; max-width: 70rem; padding: 0.6rem 1rem; border-radius: 4px; }
.flash-info { background: #e1f0e5; color: #1d5a2c; }
.flash-error { background: #f6e0e0; color: #8a2424; }
.tiles { display: flex; gap: 0.8rem; flex-wrap: wrap; margin: 0.8rem 0; }
.tile { background: #fff; border: 1px solid #d8dee5; border-radius: 4px; padding: 0.7rem 1.1rem; min-width: 7rem; }
.tile .num { font-size: 1.5rem; font-weight: 700; display: block; }
.bar-row { display: flex; align-items: center; gap: 0.5rem; margin: 0.25rem 0; }
.bar-label { width: 11rem; font-size: 0.88rem; text-align: right; }
.bar { background: #3a6ea5; height: 1rem; border-radius: 2px; }
.bar-value { font-size: 0.85rem; color: #55636f; }
.empty { color: #71808d; font-style: italic; }
.error-text { color: #8a2424; white-space: pre-wrap; font-family: monospace; }
.form-grid { display: grid; grid-template-columns: 10rem 18rem; gap: 0.5rem 0.8rem; align-items: center; background: #fff; border: 1px solid #d8dee5; padding: 1rem; border-radius: 4px; max-width: 32rem; }
"#;

pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Full page for a signed-in user: layout, nav, pending flash banner. Showing
/// the flash also clears its cookie so it surfaces exactly once.
pub fn page(
    req: &HttpRequest,
    title: &str,
    active: &str,
    session: &SessionUser,
    body: &str,
) -> HttpResponse {
    let pending = flash::take(req);
    let html = layout(title, Some((active, session)), pending.as_ref(), body);
    let mut response = HttpResponse::Ok();
    response.content_type(ContentType::html());
    if pending.is_some() {
        response.cookie(flash::clear_cookie());
    }
    response.body(html)
}

/// Page without the signed-in chrome, used by the login screen.
pub fn bare_page(req: &HttpRequest, title: &str, body: &str) -> HttpResponse {
    let pending = flash::take(req);
    let html = layout(title, None, pending.as_ref(), body);
    let mut response = HttpResponse::Ok();
    response.content_type(ContentType::html());
    if pending.is_some() {
        response.cookie(flash::clear_cookie());
    }
    response.body(html)
}

pub fn not_found_page(message: &str) -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(shell(
            "Not found",
            &format!("<h1>Not found</h1><p>{}</p>", escape(message)),
        ))
}

pub fn error_page(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type(ContentType::html())
        .body(shell(
            "Something went wrong",
            &format!("<h1>Something went wrong</h1><p>{}</p>", escape(message)),
        ))
}

fn layout(
    title: &str,
    chrome: Option<(&str, &SessionUser)>,
    pending: Option<&FlashMessage>,
    body: &str,
) -> String {
    let nav = chrome
        .map(|(active, session)| nav_bar(active, session))
        .unwrap_or_default();
    let banner = pending.map(flash_banner).unwrap_or_default();
    shell(title, &format!("{nav}{banner}<main>{body}</main>"))
}

fn shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{} | Courtside</title><style>{STYLE}</style></head>\
         <body>{body}</body></html>",
        escape(title)
    )
}

fn nav_bar(active: &str, session: &SessionUser) -> String {
    let mut links = vec![
        ("dashboard", "/dashboard", "Dashboard"),
        ("players", "/players", "Players"),
        ("games", "/games", "Games"),
    ];
    if session.role == Role::Admin {
        links.push(("admin", "/admin/sql", "Admin SQL"));
    }
    let items: String = links
        .iter()
        .map(|(key, href, label)| {
            let class = if *key == active { " class=\"active\"" } else { "" };
            format!("<a{class} href=\"{href}\">{label}</a>")
        })
        .collect();
    format!(
        "<nav>{items}<span class=\"who\">{} ({})</span><a href=\"/logout\">Log out</a></nav>",
        escape(&session.username),
        session.role
    )
}

fn flash_banner(message: &FlashMessage) -> String {
    let class = match message.level {
        FlashLevel::Info => "flash-info",
        FlashLevel::Error => "flash-error",
    };
    format!(
        "<div class=\"flash {class}\">{}</div>",
        escape(&message.message)
    )
}

/// Rows carry pre-escaped HTML cells so callers can embed links.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "<p class=\"empty\">Nothing to show.</p>".to_string();
    }
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|cell| format!("<td>{cell}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
}

pub fn option_tag(value: &str, label: &str, selected: Option<&str>) -> String {
    let marker = if selected == Some(value) {
        " selected"
    } else {
        ""
    };
    format!(
        "<option value=\"{}\"{marker}>{}</option>",
        escape(value),
        escape(label)
    )
}

/// Horizontal CSS bars scaled against the largest count.
pub fn bar_chart(data: &[(String, i64)]) -> String {
    let max = data.iter().map(|(_, count)| *count).max().unwrap_or(0);
    if max == 0 {
        return "<p class=\"empty\">No data recorded yet.</p>".to_string();
    }
    data.iter()
        .map(|(category, count)| {
            let width = count * 100 / max;
            format!(
                "<div class=\"bar-row\"><span class=\"bar-label\">{}</span>\
                 <div class=\"bar\" style=\"width:{width}%\"></div>\
                 <span class=\"bar-value\">{count}</span></div>",
                escape(category)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'quotes'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;quotes&#39;"
        );
        assert_eq!(escape("Partizan"), "Partizan");
    }

    #[test]
    fn bar_widths_scale_against_the_maximum() {
        let chart = bar_chart(&[("Serbia".to_string(), 4), ("France".to_string(), 2)]);
        assert!(chart.contains("width:100%"));
        assert!(chart.contains("width:50%"));
        assert!(chart.contains("Serbia"));
    }

    #[test]
    fn empty_chart_and_table_render_placeholders() {
        assert!(bar_chart(&[]).contains("No data"));
        assert!(table(&["Name"], &[]).contains("Nothing to show"));
    }

    #[test]
    fn option_tags_mark_the_selected_value() {
        assert!(option_tag("3", "Partizan", Some("3")).contains(" selected"));
        assert!(!option_tag("3", "Partizan", Some("4")).contains(" selected"));
        assert!(!option_tag("3", "Partizan", None).contains(" selected"));
    }

    #[test]
    fn table_escapes_headers_but_not_cells() {
        let rendered = table(
            &["<Name>"],
            &[vec!["<a href=\"/players/1\">Aris</a>".to_string()]],
        );
        assert!(rendered.contains("&lt;Name&gt;"));
        assert!(rendered.contains("<a href=\"/players/1\">Aris</a>"));
    }
}
