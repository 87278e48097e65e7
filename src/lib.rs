//! SQLite-backed catalogue of video games.
//!
//! # Intention
//!
//! - Keep a catalogue of games (name, company, year) in one SQLite file.
//! - Hand callers plain [`Game`] records; rows that cannot become one are
//!   refused at insert time by the table definition.
//!
//! # Architectural Boundaries
//!
//! - [`GameStore`] owns every statement run against the catalogue; each call
//!   opens and closes its own connection.
//! - `sqlite` holds the binding and table-description vocabulary, nothing
//!   game-specific.
//! - Console formatting lives in the binary.

pub mod error;
pub mod games;
pub mod sqlite;

pub use error::{Result, SqliteError};
pub use games::{Game, GameStore, DEFAULT_LIMIT};
pub use sqlite::{SqliteConfig, Value};
