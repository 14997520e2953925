use anyhow::Result;
use owo_colors::OwoColorize;

use household_core::config::ClientConfig;

pub fn run() -> Result<()> {
    let path = ClientConfig::config_path()?;
    let config = ClientConfig::load()?;

    println!("{}", path.display().dimmed());
    println!("   server_url = {}", config.server_url);
    println!("   language   = {}", config.language);
    println!(
        "   family_id  = {}",
        config.family_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "   user_id    = {}",
        config.user_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "   user_name  = {}",
        config.user_name.as_deref().unwrap_or("(not set)")
    );
    println!(
        "   token      = {}",
        if config.token.is_some() { "(set)" } else { "(not set)" }
    );

    Ok(())
}
