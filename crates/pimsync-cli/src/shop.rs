//! Shop session commands. Installing a shop normally happens through the
//! embedded app's OAuth flow; `register` stores a token obtained elsewhere.

use clap::Subcommand;
use sqlx::PgPool;

#[derive(Debug, Subcommand)]
pub enum ShopCommands {
    /// Store or replace the Admin API token for a shop
    Register {
        #[arg(long)]
        shop: String,
        #[arg(long, env = "PIMSYNC_SHOP_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Show which catalog settings are still missing for a shop
    Show {
        #[arg(long)]
        shop: String,
    },
    /// List shops whose catalog settings are complete
    Configured,
}

pub(crate) async fn run_shop(pool: &PgPool, command: ShopCommands) -> anyhow::Result<()> {
    match command {
        ShopCommands::Register { shop, token } => {
            let shop = shop.trim().to_ascii_lowercase();
            anyhow::ensure!(!shop.is_empty(), "shop domain must not be blank");
            anyhow::ensure!(!token.trim().is_empty(), "access token must not be blank");
            let row = pimsync_db::upsert_shop_session(pool, &shop, token.trim()).await?;
            tracing::info!(shop = %row.shop, "shop session stored");
            println!("registered {}", row.shop);
        }
        ShopCommands::Show { shop } => {
            let Some(row) = pimsync_db::get_shop_session(pool, shop.trim()).await? else {
                anyhow::bail!("shop {shop} is not installed");
            };
            let missing = row.catalog_settings().missing_fields();
            println!("shop: {}", row.shop);
            println!("catalog url: {}", row.catalog_url.as_deref().unwrap_or("-"));
            if missing.is_empty() {
                println!("catalog settings complete");
            } else {
                println!("missing: {}", missing.join(", "));
            }
        }
        ShopCommands::Configured => {
            for shop in pimsync_db::list_configured_shops(pool).await? {
                println!("{shop}");
            }
        }
    }
    Ok(())
}
