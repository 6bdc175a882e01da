//! Participant display-name resolution. Ids are collected across the whole
//! batch of games and resolved with two bulk lookups, so a page of fifty
//! games costs two queries rather than one per participant.

use crate::model::entities::{GameParticipant, ParticipantRef};
use crate::repository::database::{DataError, Database};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParticipant {
    pub reference: ParticipantRef,
    pub display_name: String,
    pub score: i32,
    pub role: Option<String>,
}

/// All club and national-team ids referenced by the batch, each list sorted
/// and deduplicated.
pub fn collect_ids(participants: &[GameParticipant]) -> (Vec<i32>, Vec<i32>) {
    let mut club_ids = HashSet::new();
    let mut team_ids = HashSet::new();
    for participant in participants {
        match participant.reference() {
            ParticipantRef::Club(id) => {
                club_ids.insert(id);
            }
            ParticipantRef::National(id) => {
                team_ids.insert(id);
            }
            ParticipantRef::Unknown { .. } => {}
        }
    }
    let mut club_ids: Vec<i32> = club_ids.into_iter().collect();
    let mut team_ids: Vec<i32> = team_ids.into_iter().collect();
    club_ids.sort_unstable();
    team_ids.sort_unstable();
    (club_ids, team_ids)
}

/// Ids that resolve get the real name; everything else falls back to a
/// synthesized label instead of failing the page.
pub fn display_name(
    reference: ParticipantRef,
    club_names: &HashMap<i32, String>,
    team_names: &HashMap<i32, String>,
) -> String {
    match reference {
        ParticipantRef::Club(id) => club_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Club #{id}")),
        ParticipantRef::National(id) => team_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Selection #{id}")),
        ParticipantRef::Unknown { id } => format!("Participant #{id}"),
    }
}

pub fn resolve(
    participants: &[GameParticipant],
    club_names: &HashMap<i32, String>,
    team_names: &HashMap<i32, String>,
) -> Vec<ResolvedParticipant> {
    participants
        .iter()
        .map(|participant| {
            let reference = participant.reference();
            ResolvedParticipant {
                reference,
                display_name: display_name(reference, club_names, team_names),
                score: participant.score,
                role: participant.role.clone(),
            }
        })
        .collect()
}

/// Resolved participants for a batch of games, grouped by game id.
pub async fn resolve_for_games(
    db: &Database,
    game_ids: &[i32],
) -> Result<HashMap<i32, Vec<ResolvedParticipant>>, DataError> {
    if game_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let participants = db.game_participants(game_ids).await?;
    let (club_ids, team_ids) = collect_ids(&participants);

    let club_names: HashMap<i32, String> = if club_ids.is_empty() {
        HashMap::new()
    } else {
        db.club_names_by_ids(&club_ids).await?.into_iter().collect()
    };
    let team_names: HashMap<i32, String> = if team_ids.is_empty() {
        HashMap::new()
    } else {
        db.national_team_names_by_ids(&team_ids)
            .await?
            .into_iter()
            .collect()
    };

    let mut by_game: HashMap<i32, Vec<ResolvedParticipant>> = HashMap::new();
    for participant in &participants {
        let reference = participant.reference();
        by_game
            .entry(participant.game_id)
            .or_default()
            .push(ResolvedParticipant {
                reference,
                display_name: display_name(reference, &club_names, &team_names),
                score: participant.score,
                role: participant.role.clone(),
            });
    }
    Ok(by_game)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(game_id: i32, kind: &str, id: i32, score: i32) -> GameParticipant {
        GameParticipant {
            game_id,
            participant_id: id,
            participant_type: kind.to_string(),
            score,
            role: Some("Home".to_string()),
        }
    }

    #[test]
    fn ids_are_collected_once_per_kind_across_the_batch() {
        let participants = vec![
            participant(1, "Club", 4, 80),
            participant(1, "National", 9, 75),
            participant(2, "club", 4, 68),
            participant(2, "Sponsor", 33, 0),
        ];
        let (club_ids, team_ids) = collect_ids(&participants);
        assert_eq!(club_ids, vec![4]);
        assert_eq!(team_ids, vec![9]);
    }

    #[test]
    fn resolved_and_missing_ids_get_the_expected_names() {
        let clubs = HashMap::from([(4, "Partizan".to_string())]);
        let teams = HashMap::new();
        let resolved = resolve(
            &[participant(1, "Club", 4, 80), participant(1, "National", 9, 75)],
            &clubs,
            &teams,
        );
        assert_eq!(resolved[0].display_name, "Partizan");
        assert_eq!(resolved[1].display_name, "Selection #9");
    }

    #[test]
    fn unknown_participant_types_get_a_generic_label() {
        let resolved = resolve(
            &[participant(3, "Sponsor", 33, 0)],
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!(resolved[0].display_name, "Participant #33");
    }

    #[test]
    fn unresolved_club_ids_fall_back_to_a_label_too() {
        let resolved = resolve(&[participant(5, "Club", 12, 70)], &HashMap::new(), &HashMap::new());
        assert_eq!(resolved[0].display_name, "Club #12");
        assert_eq!(resolved[0].score, 70);
        assert_eq!(resolved[0].role.as_deref(), Some("Home"));
    }
}
