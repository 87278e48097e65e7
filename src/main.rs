//! Demo run: version check, schema reset, two inserts, full listing and a
//! filtered listing.

use anyhow::{Context, Result};
use videojuegos::{Game, GameStore, SqliteConfig, DEFAULT_LIMIT};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = GameStore::new(SqliteConfig::from_env());
    log::info!("using database {}", store.path().display());

    let version = store.engine_version().context("reading sqlite version")?;
    println!("SQLite version: {version}");

    store.initialize_schema().context("initializing games table")?;

    store.insert_game("Resident Evil VIII", "Capcom", "2021");
    store.insert_game("Super Mario 64", "Nintendo", "1996");

    let columns = store.column_names().context("reading column names")?;
    let games = store.list_games(DEFAULT_LIMIT).context("listing games")?;
    print_games(&columns, &games);

    println!("--Consulta parametrizada--");
    let nintendo = store
        .query_by_company("Nintendo", DEFAULT_LIMIT)
        .context("querying games by company")?;
    print_games(&columns, &nintendo);

    Ok(())
}

fn print_games(columns: &[String], games: &[Game]) {
    let header = |i: usize| columns.get(i).map(String::as_str).unwrap_or_default();
    println!(
        "{:<3} {:<40} {:<15} {:<4}",
        header(0),
        header(1),
        header(2),
        header(3)
    );
    for game in games {
        println!(
            "{:<3} {:<40} {:<15} {:<4}",
            game.id, game.name, game.company, game.year
        );
    }
}
