use clap::Parser;
use solace_core::config::SolaceConfig;
use solace_core::history::InMemoryLog;
use solace_perception::{GeminiFaceAnalyzer, GeminiVoiceAnalyzer, LexiconTextAnalyzer};
use solace_reasoning::OpenRouterGenerator;
use solace_session::{SessionManager, TurnPipeline};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "solace.toml", env = "SOLACE_CONFIG")]
    config: String,

    /// Override the gateway bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the gateway bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = SolaceConfig::load_or_default(&args.config);
    if let Some(host) = args.host {
        config.gateway.host = host;
    }
    if let Some(port) = args.port {
        config.gateway.port = port;
    }

    if config.llm.api_key.is_none() {
        warn!("No LLM API key configured; responses will use the offline fallback");
    }
    if config.vision.api_key.is_none() {
        warn!("No vision API key configured; face and voice analysis will report neutral");
    }

    let text = Arc::new(LexiconTextAnalyzer::new());
    let face = Arc::new(GeminiFaceAnalyzer::new(&config.vision));
    let voice = Arc::new(GeminiVoiceAnalyzer::new(&config.vision));
    let generator = Arc::new(OpenRouterGenerator::new(config.llm.clone()));
    let log = Arc::new(InMemoryLog::new());

    let manager = Arc::new(SessionManager::new(
        text.clone(),
        face.clone(),
        voice.clone(),
        generator.clone(),
    ));
    let pipeline = Arc::new(TurnPipeline::new(
        text,
        face,
        voice,
        generator,
        log,
        config.history.max_turns,
    ));

    let server = solace_gateway::GatewayServer::new(
        manager.clone(),
        pipeline,
        &config.gateway.host,
        config.gateway.port,
    );
    let handle = server.start();

    info!("Solace online. Press Ctrl+C to shut down.");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    manager.shutdown().await;
    handle.abort();

    Ok(())
}
