//! Status command implementation

use colored::Colorize;

use crate::cli::context::resolve_store;
use crate::client::{is_token_expired, token_expiry};
use crate::config::Config;
use crate::error::Result;
use crate::transfer::AzCopy;

/// Run the status command to display configuration and session state
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "Herma Status".bold());

    match Config::load_at(config_path) {
        Ok(config) => {
            let path = Config::resolve_path(config_path)?;
            println!("Config file: {}", path.display().to_string().cyan());
            println!("Euphrosyne host: {}", config.euphrosyne.url.cyan());
            println!("Tools host: {}", config.tools.url.cyan());
            println!();

            // Session state
            let store = resolve_store()?;
            match store.load()? {
                Some(tokens) => {
                    if is_token_expired(&tokens.access_token) {
                        println!(
                            "{} Access token expired (will refresh on next command)",
                            "⚠".yellow()
                        );
                    } else if let Some(expires_at) = token_expiry(&tokens.access_token) {
                        let remaining = expires_at.signed_duration_since(chrono::Utc::now());
                        println!(
                            "{} Access token valid (expires in {}h {}m)",
                            "✓".green(),
                            remaining.num_hours(),
                            remaining.num_minutes() % 60
                        );
                    }
                }
                None => {
                    println!("{} Not signed in", "✗".red());
                    println!("  → Run 'herma login' to sign in");
                }
            }

            // Copy tool state
            match AzCopy::locate(config.tool_path.as_deref()) {
                Ok(tool) => println!("{} AzCopy found: {}", "✓".green(), tool.path().display()),
                Err(_) => {
                    println!("{} AzCopy not found", "✗".red());
                    println!("  → Install it or set `tool_path` in the config");
                }
            }

            println!();
        }
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Create {} with the euphrosyne and tools URLs, or pass --config.",
                "~/.herma/config.yaml".cyan()
            );
            println!();
        }
    }

    Ok(())
}
