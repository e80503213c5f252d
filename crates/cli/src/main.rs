use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use madadgar_agents::{DispatchAgent, LogNotifier};
use madadgar_core::{transliterate, DispatchRequest, Lexicon, Service};
use madadgar_observability::{init_tracing, AppMetrics};
use madadgar_resolver::FacilityResolver;
use madadgar_storage::Store;

// Central Karachi, where the static contact floor lives.
const DEFAULT_LAT: f64 = 24.8607;
const DEFAULT_LON: f64 = 67.0011;

#[derive(Debug, Parser)]
#[command(name = "madadgar")]
#[command(about = "Madadgar emergency triage CLI")]
struct Cli {
    #[arg(long, default_value = "data/facilities")]
    data_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive triage session.
    Chat {
        #[arg(long, default_value_t = DEFAULT_LAT)]
        lat: f64,
        #[arg(long, default_value_t = DEFAULT_LON)]
        lon: f64,
    },
    /// Triage a single message and print the full reply.
    Dispatch {
        text: String,
        #[arg(long, default_value_t = DEFAULT_LAT)]
        lat: f64,
        #[arg(long, default_value_t = DEFAULT_LON)]
        lon: f64,
        #[arg(long)]
        network: Option<String>,
        #[arg(long)]
        connection: Option<String>,
    },
    /// Look up responding facilities for a service.
    Facilities {
        service: String,
        #[arg(long, default_value_t = DEFAULT_LAT)]
        lat: f64,
        #[arg(long, default_value_t = DEFAULT_LON)]
        lon: f64,
        #[arg(long)]
        radius_km: Option<f64>,
        /// Re-read the local facility dataset before the lookup.
        #[arg(long)]
        reload: bool,
    },
    /// Convert Roman Urdu terms to Urdu script.
    Translit { text: String },
    /// List recently handled cases.
    Cases {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete case records older than the retention window.
    Purge {
        #[arg(long, default_value_t = 30)]
        older_than_days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("madadgar_cli");
    let cli = Cli::parse();

    let agent = build_agent(&cli.data_root).await?;

    match cli.command {
        Command::Chat { lat, lon } => run_chat(agent, lat, lon).await?,
        Command::Dispatch {
            text,
            lat,
            lon,
            network,
            connection,
        } => {
            let reply = agent
                .handle(DispatchRequest {
                    text,
                    lat,
                    lon,
                    radius_km: None,
                    network_quality: network,
                    connection_type: connection,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Facilities {
            service,
            lat,
            lon,
            radius_km,
            reload,
        } => {
            let service = Service::parse(&service).context("invalid service name")?;
            if reload {
                if let Some(dataset) = agent.resolver().dataset() {
                    let count = dataset.reload()?;
                    println!("reloaded {count} local facilities");
                }
            }
            let candidates = agent.resolver().resolve(service, lat, lon, radius_km).await?;
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        }
        Command::Translit { text } => {
            println!("{}", transliterate(&text));
        }
        Command::Cases { limit } => {
            let cases = agent.recent_cases(limit).await?;
            println!("{}", serde_json::to_string_pretty(&cases)?);
        }
        Command::Purge { older_than_days } => {
            let removed = agent.purge_stale_cases(older_than_days).await?;
            println!("purged {removed} case records");
        }
    }

    Ok(())
}

async fn run_chat(agent: DispatchAgent<Store, LogNotifier>, lat: f64, lon: f64) -> Result<()> {
    println!("Madadgar triage chat. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        let reply = agent
            .handle(DispatchRequest {
                text: message.to_string(),
                lat,
                lon,
                radius_km: None,
                network_quality: None,
                connection_type: None,
            })
            .await?;

        println!("\n{}\n", reply.reply_text);
    }

    Ok(())
}

async fn build_agent(data_root: &PathBuf) -> Result<DispatchAgent<Store, LogNotifier>> {
    let metrics = AppMetrics::shared();
    let lexicon = Arc::new(Lexicon::standard());
    let resolver = Arc::new(
        FacilityResolver::from_env(data_root)
            .with_context(|| format!("failed wiring resolver from {}", data_root.display()))?,
    );

    let store = if let Ok(database_url) = env::var("MADADGAR_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    Ok(DispatchAgent::new(
        lexicon,
        resolver,
        LogNotifier,
        Arc::new(store),
        metrics,
    ))
}
