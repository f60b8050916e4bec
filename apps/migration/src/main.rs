//! Migration CLI tool.
//!
//! Reads `DATABASE_URL`; run `migration up` to apply pending migrations.
//! The CLI installs its own log subscriber (`-v` for debug output).

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(migration::Migrator).await;
}
