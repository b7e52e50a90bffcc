use anyhow::Result;
use clap::Args;
use colored::Colorize;
use marble_common::{logging, Config};
use marble_site::AppState;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

pub fn serve(args: ServeArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    logging::init(&config.log.filter);

    println!("{}", "🪨 Starting Marble site...".bright_blue().bold());
    println!("   Backend: {:?}", config.backend.kind);
    println!("   Site:    http://{}", config.addr());
    println!("   Admin:   http://{}/admin-login", config.addr());
    println!();

    let state = AppState::from_config(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(marble_site::serve(state))
}
