use std::path::PathBuf;
use topicflow::{AppConfig, HttpServer, Pipeline};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topicflow=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("TOPICFLOW_CONFIG").ok().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    println!("Topicflow v{}", topicflow::version());
    println!("==========================================");
    println!("LLM:        {:?} / {}", config.llm.provider, config.llm.model);
    println!("Embeddings: {:?} / {}", config.embedding.provider, config.embedding.model);
    println!("Analysis:   {:?}", config.analysis.mode);
    println!();

    let pipeline = Pipeline::from_config(&config)?;
    let server = HttpServer::new(pipeline, config);
    server.start().await
}
