use migration::Migrator;
use sea_orm_migration::cli;

/// Standalone migration CLI (`up`, `down`, `status`, `fresh`), reads `DATABASE_URL`
#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
