use animal_detection::{
    config::{self, LogLevel},
    start_app,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},ort=warn", level.as_str())));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_level(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::get_configuration()?;
    init_tracing(config.log_level);

    if let Err(e) = start_app(config).await {
        tracing::error!("animal_detection failed: {}", e);
        return Err(e);
    }

    Ok(())
}
