//! Data access for the `games` table.
//!
//! Every [`GameStore`] operation opens its own connection and drops it (with
//! any statement and cursor) before returning, on success and on error alike.

use std::path::Path;

use log::{debug, error, info};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sqlite::{
    open_in_memory, ColumnConstraint, ColumnDefinition, DataType, Params, Schema, SqlQuery,
    SqliteConfig, TableDefinition, Value,
};

pub const GAMES_TABLE: &str = "games";

/// Row bound applied by callers that have no better limit in mind.
pub const DEFAULT_LIMIT: u32 = 10;

const SELECT_GAMES: &str = "SELECT id, name, company, year FROM games";
const LIST_GAMES: &str = "SELECT id, name, company, year FROM games LIMIT :limit";
const GAMES_BY_COMPANY: &str =
    "SELECT id, name, company, year FROM games WHERE company = :company LIMIT :limit";
const INSERT_GAME: &str = "INSERT INTO games (name, company, year) VALUES (:name, :company, :year)";

const SEED_SQL: [&str; 2] = [
    "INSERT INTO games (name, company, year) VALUES ('The Legend of Zelda: Ocarina of Time', 'Nintendo', 1998)",
    "INSERT INTO games (name, company, year) VALUES ('Final Fantasy VII', 'Squaresoft', 1997)",
];

/// The `games` table. Declared `STRICT` with every data column `NOT NULL`, so
/// the engine rejects a missing value or a year that cannot be stored as an
/// integer. Every stored row decodes into a [`Game`].
pub fn games_table() -> TableDefinition {
    TableDefinition::new(GAMES_TABLE)
        .with_column(
            ColumnDefinition::new("id", DataType::Integer)
                .with_constraint(ColumnConstraint::PrimaryKey),
        )
        .with_column(
            ColumnDefinition::new("name", DataType::Text)
                .with_constraint(ColumnConstraint::NotNull),
        )
        .with_column(
            ColumnDefinition::new("company", DataType::Text)
                .with_constraint(ColumnConstraint::NotNull),
        )
        .with_column(
            ColumnDefinition::new("year", DataType::Integer)
                .with_constraint(ColumnConstraint::NotNull),
        )
        .strict()
}

/// A single game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub company: String,
    pub year: i64,
}

impl Game {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            company: row.get(2)?,
            year: row.get(3)?,
        })
    }
}

/// Data access object over one SQLite file.
#[derive(Debug, Clone)]
pub struct GameStore {
    config: SqliteConfig,
    schema: Schema,
}

impl GameStore {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            schema: Schema::new().add_table(games_table()),
        }
    }

    pub fn path(&self) -> &Path {
        self.config.path()
    }

    /// Version of the linked SQLite engine, read from a throwaway in-memory
    /// database.
    pub fn engine_version(&self) -> Result<String> {
        let conn = open_in_memory()?;
        let version = conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Drop and recreate the `games` table, then insert the seed rows.
    /// Destroys everything previously stored.
    pub fn initialize_schema(&self) -> Result<()> {
        let conn = self.config.open()?;
        info!("resetting {} in {}", GAMES_TABLE, self.path().display());
        self.schema.reset(&conn)?;
        for sql in SEED_SQL {
            debug!("seeding: {sql}");
            conn.execute(sql, [])?;
        }
        Ok(())
    }

    /// Up to `limit` games in the engine's natural row order.
    pub fn list_games(&self, limit: u32) -> Result<Vec<Game>> {
        let conn = self.config.open()?;
        SqlQuery::new(LIST_GAMES)
            .with_params(Params::new().with_value("limit", i64::from(limit)))
            .query(&conn, Game::from_row)
    }

    /// Insert a game and return its new id.
    ///
    /// Failures are logged and reported as `None` instead of being returned
    /// to the caller. `year` is bound as given; the engine rejects NULL and
    /// anything that cannot be stored as an integer.
    pub fn insert_game(&self, name: &str, company: &str, year: impl Into<Value>) -> Option<i64> {
        match self.try_insert_game(name, company, year.into()) {
            Ok(id) => {
                debug!("inserted game {id}: {name}");
                Some(id)
            }
            Err(err) => {
                error!("failed to insert game {name:?}: {err}");
                None
            }
        }
    }

    fn try_insert_game(&self, name: &str, company: &str, year: Value) -> Result<i64> {
        let conn = self.config.open()?;
        SqlQuery::new(INSERT_GAME)
            .with_params(
                Params::new()
                    .with_value("name", name)
                    .with_value("company", company)
                    .with_value("year", year),
            )
            .execute(&conn)?;
        Ok(conn.last_insert_rowid())
    }

    /// Up to `limit` games whose company equals `company` exactly.
    pub fn query_by_company(&self, company: &str, limit: u32) -> Result<Vec<Game>> {
        let conn = self.config.open()?;
        SqlQuery::new(GAMES_BY_COMPANY)
            .with_params(
                Params::new()
                    .with_value("company", company)
                    .with_value("limit", i64::from(limit)),
            )
            .query(&conn, Game::from_row)
    }

    /// Column names as reported by the engine for the game listing.
    pub fn column_names(&self) -> Result<Vec<String>> {
        let conn = self.config.open()?;
        let stmt = conn.prepare(SELECT_GAMES)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        Ok(names)
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new(SqliteConfig::default())
    }
}
