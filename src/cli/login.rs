//! Login command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::context::resolve_store;
use crate::client::SessionClient;
use crate::config::Config;
use crate::error::Result;

/// Run the login command: one interactive attempt, tokens persisted on success
pub async fn run(config_path: Option<&str>, email: Option<String>) -> Result<()> {
    let config = Config::load_at(config_path)?;

    println!("{}", "Sign in to Euphrosyne".bold().green());
    println!("Host: {}\n", config.euphrosyne.url.cyan());

    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .interact_text()?,
    };

    let password: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;

    println!("\n{}", "Authenticating...".cyan());
    let tokens = SessionClient::login(&config.euphrosyne.url, &email, &password).await?;

    let store = resolve_store()?;
    store.save(&tokens)?;

    println!("{}", "✓ Signed in.".green());
    println!("Session stored at: {}", store.path().display());

    Ok(())
}

/// Run the logout command: drop the stored token pair
pub fn logout() -> Result<()> {
    let store = resolve_store()?;
    store.clear()?;
    println!("{}", "✓ Signed out.".green());
    Ok(())
}
