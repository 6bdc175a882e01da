use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct League {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub country: String,
    pub level: String,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct Championship {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub year: i32,
    pub kind: String,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct Club {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub city: String,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct NationalTeam {
    pub id: i32,
    pub code: String,
    pub country: String,
    pub confederation: Option<String>,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct Player {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub height: Option<f64>,
    pub citizenship: Option<String>,
    pub current_club_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::model::schema::player)]
pub struct NewPlayer {
    pub code: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub height: Option<f64>,
    pub citizenship: Option<String>,
    pub current_club_id: Option<i32>,
}

/// Full-row changeset for player edits. `None` writes NULL so a cleared
/// optional field actually clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::model::schema::player)]
#[diesel(treat_none_as_null = true)]
pub struct PlayerChanges {
    pub code: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub height: Option<f64>,
    pub citizenship: Option<String>,
    pub current_club_id: Option<i32>,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct Game {
    pub id: i32,
    pub code: String,
    pub game_date: NaiveDate,
    pub location: String,
    pub game_type: String,
    pub season: Option<String>,
    pub league_id: Option<i32>,
    pub championship_id: Option<i32>,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct GameParticipant {
    pub game_id: i32,
    pub participant_id: i32,
    pub participant_type: String,
    pub score: i32,
    pub role: Option<String>,
}

impl GameParticipant {
    pub fn reference(&self) -> ParticipantRef {
        ParticipantRef::parse(&self.participant_type, self.participant_id)
    }
}

/// The `(participant_type, participant_id)` pair from `game_participant` is a
/// polymorphic reference, not a foreign key. Tags are matched
/// case-insensitively; anything outside {club, national} lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantRef {
    Club(i32),
    National(i32),
    Unknown { id: i32 },
}

impl ParticipantRef {
    pub fn parse(kind: &str, id: i32) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "club" => ParticipantRef::Club(id),
            "national" => ParticipantRef::National(id),
            _ => ParticipantRef::Unknown { id },
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            ParticipantRef::Club(id) => id,
            ParticipantRef::National(id) => id,
            ParticipantRef::Unknown { id } => id,
        }
    }
}

/// Raw per-player per-game shot and counting stats. Points are never stored;
/// every consumer derives them through `service::stats`.
#[derive(Serialize, Debug, Clone, Copy, Default, Queryable)]
pub struct StatLine {
    pub two_pt_made: i32,
    pub two_pt_attempted: i32,
    pub three_pt_made: i32,
    pub three_pt_attempted: i32,
    pub ft_made: i32,
    pub ft_attempted: i32,
    pub assists: i32,
    pub rebounds: i32,
    pub blocks: i32,
}

#[derive(Serialize, Debug, Clone, Queryable)]
pub struct PlayerGameStats {
    pub game_id: i32,
    pub player_id: i32,
    pub two_pt_made: i32,
    pub two_pt_attempted: i32,
    pub three_pt_made: i32,
    pub three_pt_attempted: i32,
    pub ft_made: i32,
    pub ft_attempted: i32,
    pub assists: i32,
    pub rebounds: i32,
    pub blocks: i32,
}

impl PlayerGameStats {
    pub fn line(&self) -> StatLine {
        StatLine {
            two_pt_made: self.two_pt_made,
            two_pt_attempted: self.two_pt_attempted,
            three_pt_made: self.three_pt_made,
            three_pt_attempted: self.three_pt_attempted,
            ft_made: self.ft_made,
            ft_attempted: self.ft_attempted,
            assists: self.assists,
            rebounds: self.rebounds,
            blocks: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ParticipantRef;

    #[test]
    fn participant_tag_is_case_insensitive() {
        assert_eq!(ParticipantRef::parse("Club", 4), ParticipantRef::Club(4));
        assert_eq!(ParticipantRef::parse("CLUB", 4), ParticipantRef::Club(4));
        assert_eq!(
            ParticipantRef::parse("national", 9),
            ParticipantRef::National(9)
        );
        assert_eq!(
            ParticipantRef::parse(" National ", 9),
            ParticipantRef::National(9)
        );
    }

    #[test]
    fn unknown_tags_stay_representable() {
        assert_eq!(
            ParticipantRef::parse("federation", 7),
            ParticipantRef::Unknown { id: 7 }
        );
        assert_eq!(ParticipantRef::parse("federation", 7).id(), 7);
    }
}
