use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use critique::config::Settings;
use critique::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.init();

	let settings = Settings::from_env()?;
	let state = Arc::new(AppState::new(settings).await?);
	critique::server::serve(state).await
}
