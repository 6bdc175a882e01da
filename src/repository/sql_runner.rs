//! Admin-only ad-hoc SQL execution. Scripts are an explicit registry of named
//! operations with a declared kind, loaded once at startup from `.sql` files;
//! nothing is inferred from the script text at run time.

use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tokio_postgres::{NoTls, SimpleQueryMessage, Transaction};

type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Error, Debug)]
pub enum RunnerError {
    // Surfaced verbatim to the admin; the runner is a trusted debugging tool.
    #[error("{0}")]
    Postgres(#[from] tokio_postgres::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    /// Defines a view; after execution the runner selects from it and shows
    /// the result set.
    ViewDefinition { view: String },
    /// Plain script: show returned rows if any, otherwise report success.
    Script,
}

#[derive(Debug, Clone)]
pub struct SqlScript {
    pub key: String,
    pub kind: ScriptKind,
    pub sql: String,
}

impl SqlScript {
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            ScriptKind::ViewDefinition { .. } => "view definition",
            ScriptKind::Script => "script",
        }
    }
}

#[derive(Default)]
pub struct ScriptRegistry {
    scripts: BTreeMap<String, SqlScript>,
}

impl ScriptRegistry {
    /// Loads view definitions and plain scripts from their two designated
    /// directories, keyed by filename stem. Unreadable files are logged and
    /// skipped; a missing directory just contributes nothing.
    pub fn load(views_dir: &Path, scripts_dir: &Path) -> Self {
        let mut registry = ScriptRegistry::default();
        registry.load_dir(views_dir, true);
        registry.load_dir(scripts_dir, false);
        info!("registered {} admin SQL scripts", registry.scripts.len());
        registry
    }

    fn load_dir(&mut self, dir: &Path, view_definitions: bool) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("skipping script directory {}: {}", dir.display(), err);
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(sql) => {
                    let kind = if view_definitions {
                        ScriptKind::ViewDefinition {
                            view: stem.to_string(),
                        }
                    } else {
                        ScriptKind::Script
                    };
                    self.register(stem, kind, sql);
                }
                Err(err) => warn!("skipping unreadable script {}: {}", path.display(), err),
            }
        }
    }

    pub fn register(&mut self, key: &str, kind: ScriptKind, sql: impl Into<String>) {
        let script = SqlScript {
            key: key.to_string(),
            kind,
            sql: sql.into(),
        };
        if self.scripts.insert(key.to_string(), script).is_some() {
            warn!("script key '{key}' registered twice, keeping the later file");
        }
    }

    pub fn get(&self, key: &str) -> Option<&SqlScript> {
        self.scripts.get(key)
    }

    /// Menu order: ascending by key.
    pub fn iter(&self) -> impl Iterator<Item = &SqlScript> {
        self.scripts.values()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Result grid of a run. Columns are taken from the first returned row; a run
/// with no rows reports only the affected count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub affected: u64,
}

impl RunOutcome {
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Executes one registered script on a dedicated connection inside a single
/// transaction: commit on success, roll back on any failure with the raw
/// driver error handed back untouched.
pub async fn run_script(
    database_url: &str,
    script: &SqlScript,
    log_statements: bool,
) -> Result<RunOutcome> {
    let (mut client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!("script runner connection error: {err}");
        }
    });

    if log_statements {
        info!("running admin script '{}'", script.key);
        debug!("{}", script.sql);
    }

    let transaction = client.transaction().await?;
    match execute(&transaction, script).await {
        Ok(outcome) => {
            transaction.commit().await?;
            Ok(outcome)
        }
        Err(err) => {
            if let Err(rollback_err) = transaction.rollback().await {
                error!(
                    "rollback after failed script '{}' also failed: {rollback_err}",
                    script.key
                );
            }
            Err(err)
        }
    }
}

async fn execute(transaction: &Transaction<'_>, script: &SqlScript) -> Result<RunOutcome> {
    let mut outcome = collect(transaction.simple_query(&script.sql).await?);
    if let ScriptKind::ViewDefinition { view } = &script.kind {
        outcome = collect(
            transaction
                .simple_query(&format!("SELECT * FROM {view}"))
                .await?,
        );
    }
    Ok(outcome)
}

fn collect(messages: Vec<SimpleQueryMessage>) -> RunOutcome {
    let mut outcome = RunOutcome::default();
    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => {
                if outcome.columns.is_empty() {
                    outcome.columns = row
                        .columns()
                        .iter()
                        .map(|column| column.name().to_string())
                        .collect();
                }
                outcome.rows.push(
                    (0..row.len())
                        .map(|index| row.get(index).unwrap_or("NULL").to_string())
                        .collect(),
                );
            }
            SimpleQueryMessage::CommandComplete(count) => outcome.affected += count,
            _ => {}
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keys_scripts_and_orders_the_menu() {
        let mut registry = ScriptRegistry::default();
        registry.register("zonal_report", ScriptKind::Script, "SELECT 1");
        registry.register(
            "club_average_height",
            ScriptKind::ViewDefinition {
                view: "club_average_height".to_string(),
            },
            "CREATE OR REPLACE VIEW club_average_height AS SELECT 1",
        );

        let keys: Vec<&str> = registry.iter().map(|script| script.key.as_str()).collect();
        assert_eq!(keys, vec!["club_average_height", "zonal_report"]);
        assert!(registry.get("zonal_report").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn view_definitions_carry_their_view_name() {
        let mut registry = ScriptRegistry::default();
        registry.register(
            "top_national_team_scorers",
            ScriptKind::ViewDefinition {
                view: "top_national_team_scorers".to_string(),
            },
            "CREATE VIEW top_national_team_scorers AS SELECT 1",
        );
        let script = registry.get("top_national_team_scorers").unwrap();
        assert_eq!(
            script.kind,
            ScriptKind::ViewDefinition {
                view: "top_national_team_scorers".to_string()
            }
        );
        assert_eq!(script.kind_label(), "view definition");
    }

    #[test]
    fn duplicate_keys_keep_the_later_registration() {
        let mut registry = ScriptRegistry::default();
        registry.register("report", ScriptKind::Script, "SELECT 1");
        registry.register("report", ScriptKind::Script, "SELECT 2");
        assert_eq!(registry.get("report").unwrap().sql, "SELECT 2");
    }

    #[test]
    fn loading_from_disk_uses_filename_stems() {
        let base = std::env::temp_dir().join(format!("courtside-scripts-{}", std::process::id()));
        let views = base.join("views");
        let scripts = base.join("scripts");
        fs::create_dir_all(&views).unwrap();
        fs::create_dir_all(&scripts).unwrap();
        fs::write(views.join("demo_view.sql"), "CREATE VIEW demo_view AS SELECT 1").unwrap();
        fs::write(scripts.join("demo_script.sql"), "SELECT 1").unwrap();
        fs::write(scripts.join("ignored.txt"), "not sql").unwrap();

        let registry = ScriptRegistry::load(&views, &scripts);
        assert_eq!(
            registry.get("demo_view").unwrap().kind,
            ScriptKind::ViewDefinition {
                view: "demo_view".to_string()
            }
        );
        assert_eq!(registry.get("demo_script").unwrap().kind, ScriptKind::Script);
        assert!(registry.get("ignored").is_none());

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn missing_directories_yield_an_empty_registry() {
        let base = std::env::temp_dir().join("courtside-scripts-absent");
        let registry = ScriptRegistry::load(&base.join("views"), &base.join("scripts"));
        assert!(registry.is_empty());
    }
}
