//! sea-orm migration CLI for the sensors schema.
//!
//! Reads `DATABASE_URL` from the environment (or `.env`), e.g. `cargo run -p migration -- up`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(migration::Migrator).await;
}
