use std::sync::Arc;

use anyhow::Context;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use chat_relay::{
    config::Config,
    routes,
    server::{self, bind_listener, listen_addr},
    services::azure_openai::AzureOpenAiClient,
    state::AppState,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    if config.azure.is_none() {
        warn!(
            missing = ?config.missing_azure_vars,
            "Azure OpenAI is not configured; chat requests will fail"
        );
    }

    let client = AzureOpenAiClient::new(config.request_timeout)
        .context("failed to build HTTP client")?;

    let port = config.port;
    let state = Arc::new(AppState::new(config, Arc::new(client)));
    let app = routes::create_router().with_state(state);

    let listener = match bind_listener(listen_addr(port)).await {
        Ok(listener) => listener,
        Err(err) if err.is_fatal() => {
            error!("{err}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    server::serve(listener, app).await?;
    Ok(())
}
