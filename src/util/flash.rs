//! One-shot flash messages. The message rides a short-lived cookie set on the
//! redirect and is cleared by the next page render.

use actix_web::cookie::{time::Duration, Cookie};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use base64::engine::general_purpose;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn info(message: impl Into<String>) -> Self {
        FlashMessage {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        FlashMessage {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Builds the cookie carrying the message to the next request.
pub fn cookie(message: &FlashMessage) -> Cookie<'static> {
    let payload = serde_json::to_vec(message).unwrap_or_default();
    Cookie::build(FLASH_COOKIE, general_purpose::URL_SAFE_NO_PAD.encode(payload))
        .path("/")
        .http_only(true)
        .finish()
}

/// Reads the pending message, if any. Undecodable cookies are treated as
/// absent rather than surfaced.
pub fn take(req: &HttpRequest) -> Option<FlashMessage> {
    req.cookie(FLASH_COOKIE)
        .and_then(|cookie| decode(cookie.value()))
}

pub fn clear_cookie() -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, "")
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .finish()
}

pub fn redirect_with_flash(location: &str, message: FlashMessage) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(cookie(&message))
        .finish()
}

fn decode(raw: &str) -> Option<FlashMessage> {
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn message_survives_the_cookie_round_trip() {
        let message = FlashMessage::info("Player saved");
        let baked = cookie(&message);
        assert_eq!(decode(baked.value()), Some(message));
    }

    #[test]
    fn undecodable_payloads_are_dropped() {
        assert_eq!(decode("%%% not base64 %%%"), None);
        assert_eq!(
            decode(&general_purpose::URL_SAFE_NO_PAD.encode(b"not json")),
            None
        );
    }

    #[test]
    fn flash_redirect_is_a_see_other_with_cookie() {
        let response = redirect_with_flash("/dashboard", FlashMessage::error("No permission"));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(actix_web::http::header::LOCATION)
            .unwrap();
        assert_eq!(location, "/dashboard");
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cleared = clear_cookie();
        assert_eq!(cleared.name(), FLASH_COOKIE);
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
    }
}
