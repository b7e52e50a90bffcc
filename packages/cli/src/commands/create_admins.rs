//! Seed admin accounts through the configured auth service.
//!
//! Each account is signed up on its own; a failure is reported and the run
//! carries on with the next one.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use marble_backend::{AuthService, Credentials};
use marble_common::Config;
use marble_site::Backends;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CreateAdminsArgs {
    /// JSON file with an array of { "email", "password" }
    #[arg(short, long, default_value = "admins.json")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    Created { user_id: Option<String> },
    /// Account exists upstream but needs confirmation before sign-in
    NoSession,
    Failed(String),
}

pub async fn seed_admins(
    auth: &dyn AuthService,
    accounts: &[Credentials],
) -> Vec<(String, SeedOutcome)> {
    let mut report = Vec::with_capacity(accounts.len());
    for account in accounts {
        let outcome = match auth.sign_up(account).await {
            Ok(result) if result.session.is_some() => SeedOutcome::Created {
                user_id: result.user_id,
            },
            Ok(_) => SeedOutcome::NoSession,
            Err(e) => {
                tracing::error!(email = %account.email, error = %e, "admin sign-up failed");
                SeedOutcome::Failed(e.to_string())
            }
        };
        report.push((account.email.clone(), outcome));
    }
    report
}

pub fn create_admins(args: CreateAdminsArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = cwd.join(&args.file);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let accounts: Vec<Credentials> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a list of accounts", path.display()))?;

    println!(
        "{}",
        format!("👤 Creating {} admin account(s)...", accounts.len())
            .bright_blue()
            .bold()
    );

    let backends = Backends::from_config(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(seed_admins(backends.auth.as_ref(), &accounts));

    let mut failures = 0;
    for (email, outcome) in &report {
        match outcome {
            SeedOutcome::Created { user_id } => println!(
                "  {} {} ({})",
                "✓".green(),
                email,
                user_id.as_deref().unwrap_or("no id")
            ),
            SeedOutcome::NoSession => println!(
                "  {} {} created, no session returned",
                "!".yellow(),
                email
            ),
            SeedOutcome::Failed(message) => {
                failures += 1;
                eprintln!("  {} {} - {}", "✗".red(), email, message);
            }
        }
    }

    println!();
    if failures == 0 {
        println!("{}", "✅ Admin accounts ready".green().bold());
    } else {
        println!(
            "{}",
            format!("⚠️  {} of {} accounts failed", failures, report.len()).yellow()
        );
    }
    Ok(())
}
