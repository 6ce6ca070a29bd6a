use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "watchdog-cli")]
#[command(about = "Query a running connection watchdog", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every logged check
    Data,
    /// Print the most recent check
    Latest,
    /// Print the last N checks
    Tail {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/connection-data", cli.url.trim_end_matches('/')))
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("watchdog API returned status {}", status).into());
    }

    let records: Vec<Value> = res.json().await?;

    match cli.command {
        Commands::Data => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Latest => match records.last() {
            Some(latest) => println!("{}", serde_json::to_string_pretty(latest)?),
            None => println!("No checks logged yet"),
        },
        Commands::Tail { count } => {
            let start = records.len().saturating_sub(count);
            println!("{}", serde_json::to_string_pretty(&records[start..])?);
        }
    }

    Ok(())
}
