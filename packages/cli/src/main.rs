mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    create_admins, init, render, serve, CreateAdminsArgs, InitArgs, RenderArgs, ServeArgs,
};

/// Marble CLI - site server and page builder tooling
#[derive(Parser, Debug)]
#[command(name = "marble")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the site and admin page builder
    Serve(ServeArgs),

    /// Write a default marble.config.json
    Init(InitArgs),

    /// Register admin accounts from a JSON file
    CreateAdmins(CreateAdminsArgs),

    /// Render a stored page to static HTML
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Serve(args) => serve(args, &cwd),
            Command::Init(args) => init(args, &cwd),
            Command::CreateAdmins(args) => create_admins(args, &cwd),
            Command::Render(args) => render(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
