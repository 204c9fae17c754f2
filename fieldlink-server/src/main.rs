use std::process;
use std::sync::Arc;

use fieldlink_server::configs::Settings;
use fieldlink_server::run;

#[tokio::main]
async fn main() {
    let settings = match Settings::new() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level},tower_http={level}").into()
        }))
        .init();

    if let Err(e) = run(&settings).await {
        tracing::error!("Server failed: {}", e);
        process::exit(1);
    }
}
