use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use link_inbox::config::{self, Config};
use link_inbox::db::{self, ListFilter, Pool};
use link_inbox::docs::DocsClient;
use link_inbox::health;
use link_inbox::inbox::{self, ReadCounter};
use link_inbox::metadata::PageFetcher;
use link_inbox::model::{Direction, LinkRecord, RankedList};

#[derive(Debug, Parser)]
#[command(author, version, about = "Personal reading inbox backed by SQLite and a Google Doc")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save a URL (or refresh an already saved one)
    Add { url: String },
    /// List saved links
    List {
        #[arg(long, conflicts_with = "unread")]
        read: bool,
        #[arg(long)]
        unread: bool,
        /// Only the Long Reads list, in its manual order
        #[arg(long)]
        long_reads: bool,
        /// Case-insensitive match on title or url
        #[arg(long)]
        query: Option<String>,
    },
    /// Mark a link read or unread
    Toggle {
        id: String,
        #[arg(long, conflicts_with = "unread", required_unless_present = "unread")]
        read: bool,
        #[arg(long)]
        unread: bool,
    },
    /// Delete a link
    Delete { id: String },
    /// Add a link to, or remove it from, Today
    Today {
        id: String,
        #[arg(long, conflicts_with = "off", required_unless_present = "off")]
        on: bool,
        #[arg(long)]
        off: bool,
    },
    /// Move a Today link up or down
    TodayMove {
        id: String,
        #[arg(value_parser = parse_direction)]
        direction: Direction,
    },
    /// Add a link to, or remove it from, Long Reads
    LongRead {
        id: String,
        #[arg(long, conflicts_with = "off", required_unless_present = "off")]
        on: bool,
        #[arg(long)]
        off: bool,
    },
    /// Move a Long Reads link up or down
    LongReadMove {
        id: String,
        #[arg(value_parser = parse_direction)]
        direction: Direction,
    },
    /// Unread / read / long-read counts
    Stats,
    /// Append a checkbox entry for a URL to the reading document
    Append {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        summary: Option<String>,
    },
    /// Count checked-off entries in the reading document
    ReadCount,
    /// Report configuration and database readiness
    Health,
    /// Print an example config file
    ExampleConfig,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::parse_direction(s).ok_or_else(|| "direction must be 'up' or 'down'".to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn found(link: Option<LinkRecord>, id: &str) -> Result<LinkRecord> {
    link.ok_or_else(|| anyhow!("link {} not found", id))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Command::ExampleConfig = args.command {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    cfg.ensure_dirs()?;

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.default_database_url());
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    run(args.command, &cfg, &pool).await
}

async fn run(command: Command, cfg: &Config, pool: &Pool) -> Result<()> {
    match command {
        Command::Add { url } => {
            let fetcher = PageFetcher::from_config(&cfg.fetch)?;
            let link = inbox::save_link(pool, &fetcher, &url).await?;
            print_json(&link)
        }
        Command::List {
            read,
            unread,
            long_reads,
            query,
        } => {
            let filter = ListFilter {
                is_read: match (read, unread) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                long_reads_only: long_reads,
                query,
            };
            print_json(&db::list_links(pool, &filter).await?)
        }
        Command::Toggle { id, read, .. } => {
            let link = found(db::set_read(pool, &id, read).await?, &id)?;
            print_json(&link)
        }
        Command::Delete { id } => {
            if !db::delete_link(pool, &id).await? {
                return Err(anyhow!("link {} not found", id));
            }
            info!(%id, "deleted link");
            Ok(())
        }
        Command::Today { id, on, .. } => {
            let link = found(db::set_ranked(pool, RankedList::Today, &id, on).await?, &id)?;
            print_json(&link)
        }
        Command::TodayMove { id, direction } => {
            let link = db::move_ranked(pool, RankedList::Today, &id, direction)
                .await?
                .ok_or_else(|| anyhow!("link {} not in Today or not found", id))?;
            print_json(&link)
        }
        Command::LongRead { id, on, .. } => {
            let link = found(
                db::set_ranked(pool, RankedList::LongRead, &id, on).await?,
                &id,
            )?;
            print_json(&link)
        }
        Command::LongReadMove { id, direction } => {
            let link = db::move_ranked(pool, RankedList::LongRead, &id, direction)
                .await?
                .ok_or_else(|| anyhow!("link {} not in Long Reads or not found", id))?;
            print_json(&link)
        }
        Command::Stats => print_json(&db::link_stats(pool).await?),
        Command::Append {
            url,
            title,
            summary,
        } => {
            let google = cfg.require_google()?;
            let fetcher = PageFetcher::from_config(&cfg.fetch)?;
            let docs = DocsClient::new(google.access_token.clone())?;
            let block =
                inbox::append_block(&fetcher, &url, title.as_deref(), summary.as_deref()).await?;
            let outcome = inbox::append_to_doc(&docs, google, &block).await?;
            println!(
                "appended \"{}\" at index {} ({} characters, {})",
                block.title,
                outcome.insertion_index,
                outcome.inserted_length,
                outcome.preset.as_str()
            );
            Ok(())
        }
        Command::ReadCount => {
            let google = cfg.require_google()?;
            let docs = DocsClient::new(google.access_token.clone())?;
            let counter = ReadCounter::from_config(google);
            let count = counter.read_count(&docs, &google.document_id).await?;
            println!("{}", count);
            Ok(())
        }
        Command::Health => {
            let report = health::check(cfg, pool).await;
            print_json(&report)?;
            if !report.ok {
                return Err(anyhow!(report.error.unwrap_or_else(|| "unhealthy".into())));
            }
            Ok(())
        }
        Command::ExampleConfig => {
            print!("{}", config::example());
            Ok(())
        }
    }
}
