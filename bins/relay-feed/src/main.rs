mod error;
mod feed;

use clap::Parser;

#[derive(Parser)]
#[command(name = "relay-feed", about = "Stream newline-delimited JSON packets into a telemetry relay")]
struct Cli {
    /// Relay ingestion URL.
    #[arg(long, default_value = "ws://127.0.0.1:8080/", env = "RELAY_URL")]
    url: String,

    /// Read packets from this file instead of stdin.
    #[arg(long)]
    input: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = feed::run(&cli.url, cli.input.as_deref()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
