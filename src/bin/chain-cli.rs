use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use chain_subconverter::chain::{OperationLog, PairCandidate};
use chain_subconverter::config::{loader::read_config, ServiceConfig};
use chain_subconverter::subscription::{convert_document, parse_pair_list, parse_pairs, PairSource};

#[derive(Parser)]
#[command(name = "chain-cli")]
#[command(about = "Command-line client for the chain subscription converter", long_about = None)]
struct Cli {
    /// Base URL of a running converter
    #[arg(short, long, default_value = "http://localhost:11200")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the service for automatically detected pairs
    Suggest { remote_url: String },
    /// Check that pairs apply to a remote subscription
    Validate {
        remote_url: String,
        /// Pairs as `Landing:Front,Landing2:Front2`
        #[arg(short, long)]
        pairs: String,
    },
    /// Print the rewritten subscription
    Render {
        remote_url: String,
        /// Pairs as `Landing:Front,...`; detection runs when omitted
        #[arg(short, long)]
        pairs: Option<String>,
    },
    /// Rewrite a local subscription file without a server
    Local {
        file: PathBuf,
        /// Pairs as `Landing:Front,...`; detection runs when omitted
        #[arg(short, long)]
        pairs: Option<String>,
        /// Config file supplying the region table
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Suggest { remote_url } => {
            let res = client
                .get(format!("{}/api/auto_detect_pairs", cli.url))
                .query(&[("remote_url", remote_url.as_str())])
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Validate { remote_url, pairs } => {
            let pairs = parse_cli_pairs(&pairs);
            let body = json!({ "remote_url": remote_url, "node_pairs": pairs });
            let res = client
                .post(format!("{}/api/validate_configuration", cli.url))
                .json(&body)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Render { remote_url, pairs } => {
            let mut query = vec![("remote_url", remote_url)];
            match pairs {
                Some(pairs) => query.push(("manual_pairs", pairs)),
                None => query.push(("mode", "auto".to_string())),
            }
            let res = client
                .get(format!("{}/subscription.yaml", cli.url))
                .query(&query)
                .send()
                .await?;
            let status = res.status();
            let text = res.text().await?;
            if status.is_success() {
                print!("{}", text);
            } else {
                eprintln!("Error: service returned status {}: {}", status, text);
                std::process::exit(1);
            }
        }
        Commands::Local { file, pairs, config } => {
            let config = match config {
                Some(path) => read_config(&path)?,
                None => ServiceConfig::default(),
            };
            let bytes = std::fs::read(&file)?;
            let mut log = OperationLog::new();
            let result = match pairs {
                Some(text) => parse_pair_list(&text, &mut log).map(PairSource::Manual),
                None => Ok(PairSource::Auto),
            }
            .and_then(|source| convert_document(&bytes, &source, &config.pairing.rules(), &mut log));
            for entry in log.entries() {
                eprintln!("[{}] {}", entry.level, entry.message);
            }
            match result {
                Ok(conversion) => print!("{}", conversion.yaml),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn parse_cli_pairs(text: &str) -> Vec<PairCandidate> {
    let mut log = OperationLog::new();
    let pairs = parse_pairs(text, &mut log);
    for entry in log.entries() {
        eprintln!("[{}] {}", entry.level, entry.message);
    }
    pairs
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        std::process::exit(1);
    }
    Ok(())
}
