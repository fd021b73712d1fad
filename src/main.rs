//! Service entrypoint

use anyhow::Context as _;
use sms_relay::api::{build_router, AppState};
use sms_relay::config::Config;
use sms_relay::context::{
    ConversationAssembler, TiktokenEstimator, TokenEstimator, WindowTrimmer, WordBasedEstimator,
};
use sms_relay::gateway::SmsGatewayClient;
use sms_relay::history::SqliteHistoryStore;
use sms_relay::llm::ChatClient;
use sms_relay::relay::{CountryAllowList, RelayController};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::default().from_env();

    let store = SqliteHistoryStore::connect(&config.history.database_url)
        .await
        .context("failed to open history store")?;

    let estimator: Arc<dyn TokenEstimator> = match TiktokenEstimator::new() {
        Ok(estimator) => Arc::new(estimator),
        Err(e) => {
            warn!(error = %e, "tiktoken unavailable, falling back to word-based estimation");
            Arc::new(WordBasedEstimator::default())
        }
    };

    let assembler = ConversationAssembler::new(&config.context.system_prompt);
    let trimmer = WindowTrimmer::new(estimator, config.context.token_budget);
    let llm = ChatClient::new(config.llm.clone()).context("failed to build chat client")?;
    let gateway =
        SmsGatewayClient::new(config.gateway.clone()).context("failed to build gateway client")?;
    let allowlist = CountryAllowList::new(config.allowed_country_codes.clone());

    let callback_url = config.server.callback_url();
    if let Err(e) = gateway.install_webhook(&callback_url).await {
        warn!(
            error = %e,
            "webhook registration failed; inbound events will not arrive until the gateway is reachable"
        );
    }

    let controller = RelayController::new(
        Arc::new(store),
        assembler,
        trimmer,
        llm,
        gateway,
        allowlist,
    );
    let state = AppState {
        controller: Arc::new(controller),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "relay service listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
