use crate::config::config::Config;
use crate::model::entities::{
    Club, Game, GameParticipant, League, NewPlayer, Player, PlayerChanges, StatLine,
};
use crate::model::forms::{GameFilters, PlayerFilters};
use crate::model::schema::{
    championship, clubs, game, game_participant, league, national_team, player,
    player_game_stats as pgs,
};
use chrono::NaiveDate;
use deadpool::managed::Object;
use diesel::{
    ExpressionMethods, NullableExpressionMethods, OptionalExtension, PgTextExpressionMethods,
    QueryDsl,
};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection, RunQueryDsl,
};
use log::debug;
use thiserror::Error;

pub type DbPool = deadpool::managed::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;
type DbConn = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
type Result<T> = std::result::Result<T, DataError>;

pub const PLAYER_LIST_CAP: i64 = 200;
pub const GAME_LIST_CAP: i64 = 50;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("could not get database connection from pool : {0}")]
    PoolError(diesel_async::pooled_connection::deadpool::PoolError),
    #[error("database query failed : {0}")]
    QueryError(#[from] diesel::result::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub players: i64,
    pub clubs: i64,
    pub games: i64,
    pub leagues: i64,
}

pub struct Database {
    pool: DbPool,
    log_queries: bool,
}

impl Database {
    pub fn new(config: &Config) -> Self {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.clone());
        let pool = Pool::builder(manager)
            .build()
            .expect("Failed to create pool.");
        Database {
            pool,
            log_queries: config.sql_echo,
        }
    }

    async fn get_db_conn(&self) -> Result<DbConn> {
        self.pool.get().await.map_err(DataError::PoolError)
    }

    pub async fn dashboard_counts(&self) -> Result<DashboardCounts> {
        let mut conn = self.get_db_conn().await?;
        let players = player::table.count().get_result::<i64>(&mut conn).await?;
        let club_count = clubs::table.count().get_result::<i64>(&mut conn).await?;
        let games = game::table.count().get_result::<i64>(&mut conn).await?;
        let leagues = league::table.count().get_result::<i64>(&mut conn).await?;
        Ok(DashboardCounts {
            players,
            clubs: club_count,
            games,
            leagues,
        })
    }

    /// Filtered player listing with the current club name joined in. Absent
    /// filters stay out of the predicate entirely.
    pub async fn list_players(
        &self,
        filters: &PlayerFilters,
    ) -> Result<Vec<(Player, Option<String>)>> {
        if self.log_queries {
            debug!("listing players with filters {filters:?}");
        }
        let mut conn = self.get_db_conn().await?;
        let mut query = player::table
            .left_join(clubs::table)
            .select((player::all_columns, clubs::name.nullable()))
            .into_boxed();

        if let Some(needle) = &filters.name_contains {
            query = query.filter(player::name.ilike(format!("%{needle}%")));
        }
        if let Some(club_id) = filters.club_id {
            query = query.filter(player::current_club_id.eq(club_id));
        }
        if let Some(citizenship) = &filters.citizenship {
            query = query.filter(player::citizenship.eq(citizenship.clone()));
        }
        if let Some(confederation) = &filters.continent {
            // Best-effort denormalized join: citizenship matches a national
            // team country under the confederation, by name rather than key.
            let countries = national_team::table
                .filter(national_team::confederation.eq(confederation.clone()))
                .select(national_team::country.nullable());
            query = query.filter(player::citizenship.eq_any(countries));
        }

        let rows = query
            .order(player::name.asc())
            .limit(PLAYER_LIST_CAP)
            .load::<(Player, Option<String>)>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_player(&self, id: i32) -> Result<Option<Player>> {
        let mut conn = self.get_db_conn().await?;
        let found = player::table
            .find(id)
            .first::<Player>(&mut conn)
            .await
            .optional()?;
        Ok(found)
    }

    pub async fn club_name(&self, id: i32) -> Result<Option<String>> {
        let mut conn = self.get_db_conn().await?;
        let name = clubs::table
            .find(id)
            .select(clubs::name)
            .first::<String>(&mut conn)
            .await
            .optional()?;
        Ok(name)
    }

    pub async fn insert_player(&self, new_player: &NewPlayer) -> Result<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(player::table)
            .values(new_player)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn update_player(&self, id: i32, changes: &PlayerChanges) -> Result<usize> {
        let mut conn = self.get_db_conn().await?;
        let affected = diesel::update(player::table.find(id))
            .set(changes)
            .execute(&mut conn)
            .await?;
        Ok(affected)
    }

    /// A player's per-game lines with the game each belongs to, newest first.
    pub async fn player_game_log(&self, player_id: i32) -> Result<Vec<(Game, StatLine)>> {
        let mut conn = self.get_db_conn().await?;
        let rows = pgs::table
            .inner_join(game::table)
            .filter(pgs::player_id.eq(player_id))
            .order(game::game_date.desc())
            .select((
                game::all_columns,
                (
                    pgs::two_pt_made,
                    pgs::two_pt_attempted,
                    pgs::three_pt_made,
                    pgs::three_pt_attempted,
                    pgs::ft_made,
                    pgs::ft_attempted,
                    pgs::assists,
                    pgs::rebounds,
                    pgs::blocks,
                ),
            ))
            .load::<(Game, StatLine)>(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Every stat row tagged with its player, the leaderboard's raw input.
    pub async fn scoring_rows(&self) -> Result<Vec<(i32, String, StatLine)>> {
        let mut conn = self.get_db_conn().await?;
        let rows = pgs::table
            .inner_join(player::table)
            .select((
                player::id,
                player::name,
                (
                    pgs::two_pt_made,
                    pgs::two_pt_attempted,
                    pgs::three_pt_made,
                    pgs::three_pt_attempted,
                    pgs::ft_made,
                    pgs::ft_attempted,
                    pgs::assists,
                    pgs::rebounds,
                    pgs::blocks,
                ),
            ))
            .load::<(i32, String, StatLine)>(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Stat rows with player and game context, for single-game rankings.
    pub async fn performance_rows(&self) -> Result<Vec<(String, String, NaiveDate, StatLine)>> {
        let mut conn = self.get_db_conn().await?;
        let rows = pgs::table
            .inner_join(player::table)
            .inner_join(game::table)
            .select((
                player::name,
                game::code,
                game::game_date,
                (
                    pgs::two_pt_made,
                    pgs::two_pt_attempted,
                    pgs::three_pt_made,
                    pgs::three_pt_attempted,
                    pgs::ft_made,
                    pgs::ft_attempted,
                    pgs::assists,
                    pgs::rebounds,
                    pgs::blocks,
                ),
            ))
            .load::<(String, String, NaiveDate, StatLine)>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn citizenship_values(&self) -> Result<Vec<Option<String>>> {
        let mut conn = self.get_db_conn().await?;
        let values = player::table
            .select(player::citizenship)
            .load::<Option<String>>(&mut conn)
            .await?;
        Ok(values)
    }

    pub async fn distinct_citizenships(&self) -> Result<Vec<String>> {
        let mut conn = self.get_db_conn().await?;
        let values = player::table
            .select(player::citizenship)
            .distinct()
            .filter(player::citizenship.is_not_null())
            .order(player::citizenship.asc())
            .load::<Option<String>>(&mut conn)
            .await?;
        Ok(non_blank(values))
    }

    pub async fn distinct_confederations(&self) -> Result<Vec<String>> {
        let mut conn = self.get_db_conn().await?;
        let values = national_team::table
            .select(national_team::confederation)
            .distinct()
            .filter(national_team::confederation.is_not_null())
            .order(national_team::confederation.asc())
            .load::<Option<String>>(&mut conn)
            .await?;
        Ok(non_blank(values))
    }

    pub async fn distinct_seasons(&self) -> Result<Vec<String>> {
        let mut conn = self.get_db_conn().await?;
        let values = game::table
            .select(game::season)
            .distinct()
            .filter(game::season.is_not_null())
            .order(game::season.asc())
            .load::<Option<String>>(&mut conn)
            .await?;
        Ok(non_blank(values))
    }

    pub async fn distinct_game_types(&self) -> Result<Vec<String>> {
        let mut conn = self.get_db_conn().await?;
        let values = game::table
            .select(game::game_type)
            .distinct()
            .order(game::game_type.asc())
            .load::<String>(&mut conn)
            .await?;
        Ok(values.into_iter().filter(|v| !v.trim().is_empty()).collect())
    }

    pub async fn list_clubs(&self) -> Result<Vec<Club>> {
        let mut conn = self.get_db_conn().await?;
        let rows = clubs::table
            .order(clubs::name.asc())
            .load::<Club>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn list_leagues(&self) -> Result<Vec<League>> {
        let mut conn = self.get_db_conn().await?;
        let rows = league::table
            .order(league::name.asc())
            .load::<League>(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Filtered game listing with league and championship names joined in,
    /// newest first.
    pub async fn list_games(
        &self,
        filters: &GameFilters,
    ) -> Result<Vec<(Game, Option<String>, Option<String>)>> {
        if self.log_queries {
            debug!("listing games with filters {filters:?}");
        }
        let mut conn = self.get_db_conn().await?;
        let mut query = game::table
            .left_join(league::table)
            .left_join(championship::table)
            .select((
                game::all_columns,
                league::name.nullable(),
                championship::name.nullable(),
            ))
            .into_boxed();

        if let Some(season) = &filters.season_contains {
            query = query.filter(game::season.ilike(format!("%{season}%")));
        }
        if let Some(game_type) = &filters.type_contains {
            query = query.filter(game::game_type.ilike(format!("%{game_type}%")));
        }
        if let Some(league_id) = filters.league_id {
            query = query.filter(game::league_id.eq(league_id));
        }

        let rows = query
            .order(game::game_date.desc())
            .limit(GAME_LIST_CAP)
            .load::<(Game, Option<String>, Option<String>)>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_game(&self, id: i32) -> Result<Option<(Game, Option<String>, Option<String>)>> {
        let mut conn = self.get_db_conn().await?;
        let found = game::table
            .left_join(league::table)
            .left_join(championship::table)
            .filter(game::id.eq(id))
            .select((
                game::all_columns,
                league::name.nullable(),
                championship::name.nullable(),
            ))
            .first::<(Game, Option<String>, Option<String>)>(&mut conn)
            .await
            .optional()?;
        Ok(found)
    }

    pub async fn upcoming_games(&self, from: NaiveDate, limit: i64) -> Result<Vec<Game>> {
        let mut conn = self.get_db_conn().await?;
        let rows = game::table
            .filter(game::game_date.ge(from))
            .order(game::game_date.asc())
            .limit(limit)
            .load::<Game>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn game_participants(&self, game_ids: &[i32]) -> Result<Vec<GameParticipant>> {
        let mut conn = self.get_db_conn().await?;
        let rows = game_participant::table
            .filter(game_participant::game_id.eq_any(game_ids.to_vec()))
            .load::<GameParticipant>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn club_names_by_ids(&self, ids: &[i32]) -> Result<Vec<(i32, String)>> {
        let mut conn = self.get_db_conn().await?;
        let rows = clubs::table
            .filter(clubs::id.eq_any(ids.to_vec()))
            .select((clubs::id, clubs::name))
            .load::<(i32, String)>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn national_team_names_by_ids(&self, ids: &[i32]) -> Result<Vec<(i32, String)>> {
        let mut conn = self.get_db_conn().await?;
        let rows = national_team::table
            .filter(national_team::id.eq_any(ids.to_vec()))
            .select((national_team::id, national_team::country))
            .load::<(i32, String)>(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Box score for one game: every stat line with its player, name order.
    pub async fn game_box_score(&self, game_id: i32) -> Result<Vec<(Player, StatLine)>> {
        let mut conn = self.get_db_conn().await?;
        let rows = pgs::table
            .inner_join(player::table)
            .filter(pgs::game_id.eq(game_id))
            .order(player::name.asc())
            .select((
                player::all_columns,
                (
                    pgs::two_pt_made,
                    pgs::two_pt_attempted,
                    pgs::three_pt_made,
                    pgs::three_pt_attempted,
                    pgs::ft_made,
                    pgs::ft_attempted,
                    pgs::assists,
                    pgs::rebounds,
                    pgs::blocks,
                ),
            ))
            .load::<(Player, StatLine)>(&mut conn)
            .await?;
        Ok(rows)
    }
}

fn non_blank(values: Vec<Option<String>>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .filter(|value| !value.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::non_blank;

    #[test]
    fn non_blank_drops_null_and_whitespace_values() {
        let values = vec![
            Some("FIBA Europe".to_string()),
            None,
            Some("  ".to_string()),
            Some("FIBA Americas".to_string()),
        ];
        assert_eq!(
            non_blank(values),
            vec!["FIBA Europe".to_string(), "FIBA Americas".to_string()]
        );
    }
}
