mod bank;
mod cache;
mod config;
mod db;
mod import;
mod logging;
mod models;
mod run;
#[cfg(test)]
mod testing;
mod ui;

use anyhow::{Context, Result};

use logging::LogTarget;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    prepare_data_dir(&config)?;

    // The TUI owns the terminal, so its logs go to a file
    let log_path = config.log_path();
    let target = if args.len() == 1 {
        LogTarget::File(&log_path)
    } else {
        LogTarget::Stderr
    };
    logging::init_logging(target)?;

    let mut db = db::Database::open(&config.db_path)?;
    let cache = cache::open_cache(&config)?;

    match args.len() {
        1 => run::as_tui(&config, cache.as_ref(), &mut db),
        2.. => run::as_cli(&args, &config, cache.as_ref(), &mut db),
        _ => {
            eprintln!("Usage: bankfeed [command]");
            Ok(())
        }
    }
}

fn prepare_data_dir(config: &config::Config) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.data_dir.display()
        )
    })?;
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
