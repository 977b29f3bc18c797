//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::config::{Config, HostConfig};
use crate::error::Result;

/// Run the init command: write a config file with the two host URLs
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to Herma!".bold().green());
    println!("Let's set up your Euphrosyne configuration.\n");

    let euphrosyne_url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Euphrosyne URL")
        .interact_text()?;

    let tools_url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Euphrosyne tools URL")
        .interact_text()?;

    let config = Config {
        euphrosyne: HostConfig {
            url: euphrosyne_url.trim_end_matches('/').to_string(),
        },
        tools: HostConfig {
            url: tools_url.trim_end_matches('/').to_string(),
        },
        tool_path: None,
    };
    config.save_at(config_path)?;

    let path = Config::resolve_path(config_path)?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Sign in to Euphrosyne", "herma login".cyan());
    println!("  {} - List your projects", "herma projects".cyan());

    Ok(())
}
