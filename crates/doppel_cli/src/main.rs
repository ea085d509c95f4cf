use clap::{Parser, Subcommand};
use doppel_core::{DoppelConfig, Notifier};
use doppel_ingest::{Ingestor, LinkedinProvider, Orchestrator, TwitterProvider};
use doppel_store::{Catalog, SqliteStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Catalog page size, matching the web surface.
const PAGE_SIZE: usize = 50;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "doppel.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a persona from a Twitter/X or LinkedIn handle
    Create {
        /// Handle to ingest, with or without a leading @
        handle: String,
    },
    /// Browse the persona catalog, most popular first
    Browse {
        /// Case-insensitive substring filter on name or username
        #[arg(short, long)]
        search: Option<String>,
        /// Number of pages to fetch
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
}

/// Terminal rendition of the notification/navigation surface.
struct CliNotifier;

impl Notifier for CliNotifier {
    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn open_chat(&self, persona_id: &str) {
        println!("Chat ready: /chat?id={}", persona_id);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config = DoppelConfig::load_or_default(&args.config);
    info!("Opening persona store at {}", config.store.db_path);
    let store = Arc::new(SqliteStore::new(&config.store.db_path).await?);

    match args.command {
        Command::Create { handle } => {
            let notifier: Arc<dyn Notifier> = Arc::new(CliNotifier);
            let mut orchestrator = Orchestrator::new(notifier.clone());
            orchestrator.register(Ingestor::new(
                Arc::new(TwitterProvider::from_config(&config.twitter)?),
                store.clone(),
                notifier.clone(),
                config.prompt.extra_rules.clone(),
            ));
            orchestrator.register(Ingestor::new(
                Arc::new(LinkedinProvider::from_config(&config.linkedin)?),
                store.clone(),
                notifier.clone(),
                config.prompt.extra_rules.clone(),
            ));

            let successes = orchestrator.create_persona(&handle).await;
            if successes == 0 {
                std::process::exit(1);
            }
        }
        Command::Browse { search, pages } => {
            let mut catalog = Catalog::new(PAGE_SIZE);
            for page in 0..pages {
                catalog.load_page(&*store, page == 0).await?;
                if !catalog.has_more() {
                    break;
                }
            }

            let query = search.unwrap_or_default();
            for record in catalog.filter(&query) {
                println!(
                    "{:>10}  {} (@{}) [{}]  created {}",
                    record.sub_count, record.name, record.username, record.platform,
                    record.created_at
                );
            }
        }
    }

    Ok(())
}
