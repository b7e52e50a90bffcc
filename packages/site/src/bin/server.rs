use marble_common::{logging, Config};
use marble_site::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;
    logging::init(&config.log.filter);

    tracing::info!(backend = ?config.backend.kind, root = %cwd.display(), "starting marble site");
    let state = AppState::from_config(config)?;
    marble_site::serve(state).await
}
