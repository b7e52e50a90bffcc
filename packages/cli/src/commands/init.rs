use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use marble_common::{BackendKind, Config, ConfigError, DEFAULT_CONFIG_NAME};
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendChoice {
    Memory,
    File,
    Supabase,
}

impl From<BackendChoice> for BackendKind {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Memory => BackendKind::Memory,
            BackendChoice::File => BackendKind::File,
            BackendChoice::Supabase => BackendKind::Supabase,
        }
    }
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Storage backend to configure
    #[arg(short, long, value_enum, default_value = "file")]
    pub backend: BackendChoice,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::default();
    config.backend.kind = args.backend.into();

    let path = match config.write(cwd, args.force) {
        Ok(path) => path,
        Err(ConfigError::AlreadyExists(_)) => {
            println!(
                "{} {} already exists",
                "⚠️".yellow(),
                DEFAULT_CONFIG_NAME.bright_white()
            );
            println!("Use --force to overwrite");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("  {} Created {}", "✓".green(), path.display());
    println!();
    println!("Next steps:");
    if config.backend.kind == BackendKind::Supabase {
        println!("  1. Set MARBLE_BACKEND_URL and MARBLE_BACKEND_KEY");
    } else {
        println!("  1. Add accounts under backend.admins");
    }
    println!("  2. Run: marble serve");
    println!("  3. Open http://{}/admin-login", config.addr());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let args = || InitArgs {
            backend: BackendChoice::File,
            force: false,
        };

        init(args(), dir.path()).unwrap();
        let written = Config::load_file(dir.path()).unwrap();
        assert_eq!(written.backend.kind, BackendKind::File);

        // A second run leaves the file alone
        std::fs::write(Config::path_in(dir.path()), "{}").unwrap();
        init(args(), dir.path()).unwrap();
        let kept = std::fs::read_to_string(Config::path_in(dir.path())).unwrap();
        assert_eq!(kept, "{}");
    }
}
