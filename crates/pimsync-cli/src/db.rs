use clap::Subcommand;
use sqlx::PgPool;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

pub(crate) async fn run_db(pool: &PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Migrate => {
            let applied = pimsync_db::run_migrations(pool).await?;
            tracing::info!(applied, "migrations applied");
            println!("migrations up to date ({applied} applied)");
        }
        DbCommands::Ping => {
            pimsync_db::health_check(pool).await?;
            println!("database ok");
        }
    }
    Ok(())
}
