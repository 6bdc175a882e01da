use crate::model::entities::{NewPlayer, Player, PlayerChanges};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

lazy_static! {
    static ref RECORD_CODE_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,10}$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Raw player mutation form, exactly as the browser posts it. Everything is a
/// string here; `validate_input` produces the typed record or the message to
/// show above the re-rendered form.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PlayerForm {
    #[validate(regex(
        path = "RECORD_CODE_RE",
        message = "Code must be 1-10 letters, digits, dashes or underscores"
    ))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub citizenship: String,
    #[serde(default)]
    pub club_id: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("{0}")]
    Invalid(String),
    #[error("Date of birth is required.")]
    MissingDateOfBirth,
    #[error("Date of birth must use the YYYY-MM-DD format.")]
    BadDateOfBirth,
    #[error("Height must be a number.")]
    BadHeight,
    #[error("Club selection must be a numeric id.")]
    BadClub,
}

/// A fully validated player record, ready to insert or apply as a changeset.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInput {
    pub code: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub height: Option<f64>,
    pub citizenship: Option<String>,
    pub current_club_id: Option<i32>,
}

impl PlayerForm {
    pub fn validate_input(&self) -> Result<PlayerInput, FormError> {
        self.validate()
            .map_err(|errors| FormError::Invalid(first_message(&errors)))?;

        let dob = self.date_of_birth.trim();
        if dob.is_empty() {
            return Err(FormError::MissingDateOfBirth);
        }
        let date_of_birth =
            NaiveDate::parse_from_str(dob, "%Y-%m-%d").map_err(|_| FormError::BadDateOfBirth)?;

        let height = match self.height.trim() {
            "" => None,
            raw => Some(raw.parse::<f64>().map_err(|_| FormError::BadHeight)?),
        };

        let current_club_id = match self.club_id.trim() {
            "" => None,
            raw => Some(raw.parse::<i32>().map_err(|_| FormError::BadClub)?),
        };

        let citizenship = match self.citizenship.trim() {
            "" => None,
            raw => Some(raw.to_string()),
        };

        Ok(PlayerInput {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            date_of_birth,
            height,
            citizenship,
            current_club_id,
        })
    }

    /// Prefill for the edit form.
    pub fn from_player(player: &Player) -> Self {
        PlayerForm {
            code: player.code.clone(),
            name: player.name.clone(),
            date_of_birth: player.date_of_birth.format("%Y-%m-%d").to_string(),
            height: player.height.map(|h| h.to_string()).unwrap_or_default(),
            citizenship: player.citizenship.clone().unwrap_or_default(),
            club_id: player
                .current_club_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

impl PlayerInput {
    pub fn to_insert(&self) -> NewPlayer {
        NewPlayer {
            code: self.code.clone(),
            name: self.name.clone(),
            date_of_birth: self.date_of_birth,
            height: self.height,
            citizenship: self.citizenship.clone(),
            current_club_id: self.current_club_id,
        }
    }

    pub fn to_changes(&self) -> PlayerChanges {
        PlayerChanges {
            code: self.code.clone(),
            name: self.name.clone(),
            date_of_birth: self.date_of_birth,
            height: self.height,
            citizenship: self.citizenship.clone(),
            current_club_id: self.current_club_id,
        }
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(_, field_errors)| field_errors.iter())
        .filter_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

// --- listing filters ---------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PlayerListQuery {
    pub q: Option<String>,
    pub club: Option<String>,
    pub citizenship: Option<String>,
    pub continent: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerFilters {
    pub name_contains: Option<String>,
    pub club_id: Option<i32>,
    pub citizenship: Option<String>,
    pub continent: Option<String>,
}

impl PlayerListQuery {
    /// Blank and unparseable filter values drop out of the predicate entirely.
    pub fn filters(&self) -> PlayerFilters {
        PlayerFilters {
            name_contains: clean(self.q.as_deref()),
            club_id: clean(self.club.as_deref()).and_then(|raw| raw.parse().ok()),
            citizenship: clean(self.citizenship.as_deref()),
            continent: clean(self.continent.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GameListQuery {
    pub season: Option<String>,
    #[serde(rename = "type")]
    pub game_type: Option<String>,
    pub league: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GameFilters {
    pub season_contains: Option<String>,
    pub type_contains: Option<String>,
    pub league_id: Option<i32>,
}

impl GameListQuery {
    pub fn filters(&self) -> GameFilters {
        GameFilters {
            season_contains: clean(self.season.as_deref()),
            type_contains: clean(self.game_type.as_deref()),
            league_id: clean(self.league.as_deref()).and_then(|raw| raw.parse().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SqlRunForm {
    pub query_key: String,
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PlayerForm {
        PlayerForm {
            code: "PLY-017".to_string(),
            name: "Nikola Vukovic".to_string(),
            date_of_birth: "1998-03-14".to_string(),
            height: "2.06".to_string(),
            citizenship: "Serbia".to_string(),
            club_id: "3".to_string(),
        }
    }

    #[test]
    fn valid_form_produces_typed_input() {
        let input = valid_form().validate_input().unwrap();
        assert_eq!(input.name, "Nikola Vukovic");
        assert_eq!(
            input.date_of_birth,
            NaiveDate::from_ymd_opt(1998, 3, 14).unwrap()
        );
        assert_eq!(input.height, Some(2.06));
        assert_eq!(input.citizenship.as_deref(), Some("Serbia"));
        assert_eq!(input.current_club_id, Some(3));
    }

    #[test]
    fn date_of_birth_is_mandatory() {
        let mut form = valid_form();
        form.date_of_birth = "  ".to_string();
        assert_eq!(
            form.validate_input().unwrap_err(),
            FormError::MissingDateOfBirth
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut form = valid_form();
        form.date_of_birth = "14/03/1998".to_string();
        assert_eq!(form.validate_input().unwrap_err(), FormError::BadDateOfBirth);
    }

    #[test]
    fn non_numeric_height_and_club_are_rejected() {
        let mut form = valid_form();
        form.height = "tall".to_string();
        assert_eq!(form.validate_input().unwrap_err(), FormError::BadHeight);

        let mut form = valid_form();
        form.club_id = "Partizan".to_string();
        assert_eq!(form.validate_input().unwrap_err(), FormError::BadClub);
    }

    #[test]
    fn blank_optionals_become_none() {
        let mut form = valid_form();
        form.height = String::new();
        form.citizenship = " ".to_string();
        form.club_id = String::new();
        let input = form.validate_input().unwrap();
        assert_eq!(input.height, None);
        assert_eq!(input.citizenship, None);
        assert_eq!(input.current_club_id, None);
    }

    #[test]
    fn filter_cleanup_drops_blank_and_unparseable_values() {
        let query = PlayerListQuery {
            q: Some("  jok ".to_string()),
            club: Some("not-a-number".to_string()),
            citizenship: Some(String::new()),
            continent: Some("FIBA Europe".to_string()),
        };
        let filters = query.filters();
        assert_eq!(filters.name_contains.as_deref(), Some("jok"));
        assert_eq!(filters.club_id, None);
        assert_eq!(filters.citizenship, None);
        assert_eq!(filters.continent.as_deref(), Some("FIBA Europe"));
    }
}
