//! Migration CLI for the task_items schema.
//!
//! Reads `DATABASE_URL`; run `migration up` to create the table and seed the
//! sample tasks, `migration down` to roll back.

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
