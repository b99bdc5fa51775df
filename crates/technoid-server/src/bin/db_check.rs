//! Smoke test for the contact store: open an existing store and run a trivial query.

use tracing::{error, info};

use technoid_server::config::Config;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    technoid_server::init_tracing();

    let config = Config::from_env()?;

    let result =
        technoid_db::Database::open_existing(&config.db_path, 1).and_then(|db| db.ping());
    match result {
        Ok(value) => {
            info!("Connected to database at {}", config.db_path.display());
            info!("Test query result: SELECT 1 + 1 = {}", value);
            Ok(())
        }
        Err(e) => {
            error!("Database connection failed: {}", e);
            Err(e.into())
        }
    }
}
