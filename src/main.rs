mod agent;
mod logging;
mod openai;
mod protocol;
mod server;
mod tools;

use agent::Agent;
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "tour-concierge",
    about = "Streaming chat backend for the virtual tour assistant"
)]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init()?;

    let api_key =
        std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY environment variable not set")?;
    let weather_api_key = std::env::var("WEATHER_API_KEY").unwrap_or_default();
    if weather_api_key.is_empty() {
        tracing::warn!("WEATHER_API_KEY is not set; weather lookups will fail");
    }

    let agent = Arc::new(Agent::new(api_key, weather_api_key));
    let app = server::router(agent);

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("Listening on port {}", cli.port);
    tracing::info!(port = cli.port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
