mod account;
mod catalog;
mod orders;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use shopfront_api::ApiClient;
use shopfront_store::{FileStore, SessionStore};
use tracing_subscriber::EnvFilter;

use crate::orders::ItemSpec;

/// Lets passwords stay out of argv and shell history.
const PASSWORD_ENV: &str = "SHOPFRONT_PASSWORD";
const CONFIRM_PASSWORD_ENV: &str = "SHOPFRONT_CONFIRM_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "shopfront")]
#[command(about = "Storefront client for a headless content API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Username or email address
        #[arg(long)]
        identifier: String,
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: String,
        #[arg(long, env = CONFIRM_PASSWORD_ENV, hide_env_values = true)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Re-fetch the profile from the backend
        #[arg(long)]
        remote: bool,
    },
    /// List the product catalog
    Products,
    /// Create a product, optionally with an image
    Upload {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        category: Option<String>,
        /// Local image file to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Put products in a cart and place the order
    Checkout {
        /// Product to buy, as ID or ID:QTY (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<ItemSpec>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = shopfront_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("shopfront: no command given; run `shopfront --help` for usage");
        return Ok(());
    };

    let api = ApiClient::from_config(&config)?;
    let sessions = SessionStore::new(
        api.clone(),
        Arc::new(FileStore::new(config.session_path.clone())),
    );
    sessions.restore_session();
    tracing::debug!(
        env = %config.env,
        api_url = %config.api_url,
        signed_in = sessions.is_authenticated(),
        "client ready"
    );

    match command {
        Commands::Login {
            identifier,
            password,
        } => account::run_login(&sessions, &identifier, &password).await,
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            account::run_register(&sessions, &username, &email, &password, &confirm_password)
                .await
        }
        Commands::Logout => {
            account::run_logout(&sessions);
            Ok(())
        }
        Commands::Whoami { remote } => account::run_whoami(&sessions, remote).await,
        Commands::Products => catalog::run_products(&api, &sessions).await,
        Commands::Upload {
            name,
            price,
            category,
            image,
        } => catalog::run_upload(&api, &sessions, name, price, category, image.as_deref()).await,
        Commands::Checkout { items } => orders::run_checkout(&api, &sessions, &items).await,
    }
}

/// Returns the stored bearer token, or an error telling the user to sign in.
fn require_token(sessions: &SessionStore) -> anyhow::Result<String> {
    sessions
        .token()
        .ok_or_else(|| anyhow::anyhow!("not signed in; run `shopfront login` first"))
}
