mod catalog;
mod db;
mod shop;

use clap::{Parser, Subcommand};
use pimsync_core::ResourceType;
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::shop::ShopCommands;

#[derive(Debug, Parser)]
#[command(name = "pimsync-cli")]
#[command(about = "Browse a PIM catalog and import it into a Shopify store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Installed shop sessions
    Shop {
        #[command(subcommand)]
        command: ShopCommands,
    },
    /// List one page of a catalog resource
    List {
        /// attributes, categories, families or products
        resource: ResourceType,
        #[arg(long, env = "PIMSYNC_SHOP")]
        shop: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Category code; products only
        #[arg(long)]
        category: Option<String>,
    },
    /// Import selected items from one catalog page into the shop
    Import {
        resource: ResourceType,
        #[arg(long, env = "PIMSYNC_SHOP")]
        shop: String,
        /// Comma-separated codes taken from the page
        #[arg(long, value_delimiter = ',', required = true)]
        codes: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pimsync-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = pimsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = pimsync_db::PoolConfig::from_app_config(&config);
    let pool = pimsync_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => db::run_db(&pool, command).await,
        Commands::Shop { command } => shop::run_shop(&pool, command).await,
        Commands::List {
            resource,
            shop,
            page,
            category,
        } => catalog::run_list(&pool, &config, &shop, resource, page, category).await,
        Commands::Import {
            resource,
            shop,
            codes,
            page,
            category,
        } => {
            let target = catalog::PageTarget {
                resource,
                page,
                category,
            };
            catalog::run_import(&pool, &config, &shop, target, codes).await
        }
    }
}
