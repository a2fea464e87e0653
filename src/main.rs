use anyhow::Context;
use kumao::config::RelayConfig;
use kumao::prompts::PromptConfig;
use kumao::server::build_router;
use kumao::util::{env_bind_addr, init_tracing, AppState};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    // Check for --prompt-config flag
    let prompt_config_arg = args
        .iter()
        .find(|a| a.starts_with("--prompt-config="))
        .and_then(|a| a.strip_prefix("--prompt-config="))
        .map(|s| s.to_string());

    let mut config = RelayConfig::from_env()?;
    if let Some(path) = prompt_config_arg {
        tracing::info!("Loading prompt configuration from: {}", path);
        config = config.with_prompts(PromptConfig::load_from_file(&path)?);
    } else {
        tracing::info!("No prompt config provided, using built-in prompts");
    }
    tracing::info!(?config, "relay configured");

    let app = build_router(AppState::new(config)?);

    let addr = env_bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("kumao listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
