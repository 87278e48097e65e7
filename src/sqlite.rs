use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{Connection, Row};
use serde::Deserialize;

use crate::error::{Result, SqliteError};

/// Default database file, resolved against the current working directory.
pub const DEFAULT_DB_PATH: &str = "videojuegos.db";

/// Environment variable that overrides the database path.
pub const DB_PATH_ENV: &str = "VIDEOJUEGOS_DB";

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
            Value::Boolean(b) => ToSqlOutput::from(*b),
        })
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Named parameter bindings for SQL queries.
///
/// Names carry their SQLite prefix (`:name`, `@name` or `$name`); a bare name
/// gets `:` prepended.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub values: HashMap<String, Value>,
}

impl Params {
    /// Create a new Params object
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        let name = if name.starts_with(|c: char| matches!(c, ':' | '@' | '$')) {
            name.to_string()
        } else {
            format!(":{name}")
        };
        self.values.insert(name, value.into());
        self
    }

    fn bindings(&self) -> Vec<(&str, &dyn ToSql)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect()
    }
}

/// SQL Query with typed parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Params,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Params::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Run a statement that returns no rows, yielding the affected row count.
    pub fn execute(&self, conn: &Connection) -> Result<usize> {
        debug!("executing: {}", self.statement);
        let mut stmt = conn.prepare(&self.statement)?;
        let affected = stmt.execute(self.params.bindings().as_slice())?;
        Ok(affected)
    }

    /// Run a query and map every row. The statement and its cursor are
    /// dropped before returning.
    pub fn query<T, F>(&self, conn: &Connection, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!("querying: {}", self.statement);
        let mut stmt = conn.prepare(&self.statement)?;
        let rows = stmt.query_map(self.params.bindings().as_slice(), map)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}

/// Schema definition for the SQLite database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// Drop and recreate every table. All rows are lost.
    pub fn reset(&self, conn: &Connection) -> Result<()> {
        for table in &self.tables {
            conn.execute(&table.drop_sql(), [])?;
            conn.execute(&table.create_sql(), [])?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    /// Render the `STRICT` table option, making SQLite reject values that do
    /// not fit the declared column type.
    pub strict: bool,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            strict: false,
        }
    }

    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnDefinition::to_sql)
            .collect::<Vec<_>>()
            .join(", ");
        let options = if self.strict { " STRICT" } else { "" };
        format!("CREATE TABLE {} ({}){}", self.name, columns, options)
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.as_sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.as_sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
}

impl DataType {
    pub fn as_sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
}

impl ColumnConstraint {
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::NotNull => "NOT NULL",
        }
    }
}

/// SQLite configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
}

impl SqliteConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Use `VIDEOJUEGOS_DB` when set, otherwise the default file name.
    pub fn from_env() -> Self {
        std::env::var_os(DB_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a fresh connection to the configured file, creating it if absent.
    pub fn open(&self) -> Result<Connection> {
        debug!("opening sqlite database at {}", self.db_path.display());
        Connection::open(&self.db_path).map_err(|source| SqliteError::Open {
            path: self.db_path.display().to_string(),
            source,
        })
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

/// Open a transient in-memory database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|source| SqliteError::Open {
        path: ":memory:".to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> TableDefinition {
        TableDefinition::new("people")
            .with_column(
                ColumnDefinition::new("id", DataType::Integer)
                    .with_constraint(ColumnConstraint::PrimaryKey),
            )
            .with_column(
                ColumnDefinition::new("email", DataType::Text)
                    .with_constraint(ColumnConstraint::NotNull),
            )
            .with_column(ColumnDefinition::new("score", DataType::Integer))
    }

    #[test]
    fn create_sql_renders_columns_and_constraints() {
        assert_eq!(
            people().create_sql(),
            "CREATE TABLE people (id INTEGER PRIMARY KEY, email TEXT NOT NULL, score INTEGER)"
        );
        assert_eq!(
            people().strict().create_sql(),
            "CREATE TABLE people (id INTEGER PRIMARY KEY, email TEXT NOT NULL, score INTEGER) STRICT"
        );
        assert_eq!(people().drop_sql(), "DROP TABLE IF EXISTS people");
    }

    #[test]
    fn params_prefix_bare_names() {
        let params = Params::new()
            .with_value("email", "a@b.c")
            .with_value("@score", 1.5)
            .with_value(":id", 7);
        assert!(params.values.contains_key(":email"));
        assert!(params.values.contains_key("@score"));
        assert_eq!(params.values.get(":id"), Some(&Value::Integer(7)));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn schema_reset_drops_existing_rows() {
        let conn = open_in_memory().unwrap();
        let schema = Schema::new().add_table(people());
        schema.reset(&conn).unwrap();

        SqlQuery::new("INSERT INTO people (email, score) VALUES (:email, :score)")
            .with_params(Params::new().with_value("email", "x@y.z").with_value("score", 2))
            .execute(&conn)
            .unwrap();
        schema.reset(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn query_binds_named_params() {
        let conn = open_in_memory().unwrap();
        Schema::new().add_table(people()).reset(&conn).unwrap();
        for (email, score) in [("a@x", 1), ("b@x", 2), ("c@x", 3)] {
            SqlQuery::new("INSERT INTO people (email, score) VALUES (:email, :score)")
                .with_params(Params::new().with_value("email", email).with_value("score", score))
                .execute(&conn)
                .unwrap();
        }

        let emails = SqlQuery::new("SELECT email FROM people WHERE score >= :min ORDER BY id")
            .with_params(Params::new().with_value("min", 2))
            .query(&conn, |row| row.get::<_, String>(0))
            .unwrap();
        assert_eq!(emails, vec!["b@x".to_string(), "c@x".to_string()]);
    }

    #[test]
    fn not_null_column_rejects_null_binding() {
        let conn = open_in_memory().unwrap();
        Schema::new().add_table(people().strict()).reset(&conn).unwrap();
        let err = SqlQuery::new("INSERT INTO people (email, score) VALUES (:email, :score)")
            .with_params(Params::new().with_value("email", None::<&str>).with_value("score", 1))
            .execute(&conn)
            .unwrap_err();
        assert!(matches!(err, SqliteError::Engine(_)));
    }

    #[test]
    fn unknown_parameter_name_is_an_engine_error() {
        let conn = open_in_memory().unwrap();
        Schema::new().add_table(people()).reset(&conn).unwrap();
        let err = SqlQuery::new("SELECT id FROM people WHERE email = :email")
            .with_params(Params::new().with_value("mail", "a@x"))
            .query(&conn, |row| row.get::<_, i64>(0))
            .unwrap_err();
        assert!(matches!(err, SqliteError::Engine(_)));
    }

    #[test]
    fn config_defaults_to_working_directory_file() {
        assert_eq!(SqliteConfig::default().path(), Path::new(DEFAULT_DB_PATH));
    }
}
