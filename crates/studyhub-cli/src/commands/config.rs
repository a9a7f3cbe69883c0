//! Config command - Manage StudyHub configuration

use crate::config::SettingsManager;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use studyhub_core::{ConfigManager, FileStorage, StudyConfig};

/// Show current configuration
pub async fn show(home: &Path) -> Result<()> {
    let config = SettingsManager::load_config(home)?;
    let config_file = ConfigManager::find_config_file(home);
    let storage = FileStorage::new(SettingsManager::store_dir(home));

    println!("{}", "StudyHub Configuration".bold().underline());
    println!();

    println!("{}", "Location:".cyan().bold());
    println!("  Home:        {}", home.display());
    match config_file {
        Some(path) => println!("  Config file: {}", path.display()),
        None => println!("  Config file: {}", "(defaults)".dimmed()),
    }
    println!(
        "  Tree file:   {}",
        storage.path_for(&config.storage_key).display()
    );
    println!();

    println!("{}", "Storage:".cyan().bold());
    println!("  Key:         {}", config.storage_key);
    println!("  Pretty JSON: {}", config.pretty_json);
    println!();

    println!("{}", "Sample data:".cyan().bold());
    println!("  Enabled:     {}", config.seed.enabled);
    println!("  Max folders: {}", config.seed.max_folders);
    println!("  Max files:   {}", config.seed.max_files);

    let validation = ConfigManager::new().validate(&config);
    if !validation.warnings.is_empty() {
        println!();
        for warning in &validation.warnings {
            println!(
                "{} {}: {}",
                "⚠️".yellow(),
                warning.field,
                warning.message.dimmed()
            );
        }
    }

    Ok(())
}

/// Write a default configuration file into the home directory
pub async fn init(home: &Path, force: bool) -> Result<()> {
    if let Some(existing) = ConfigManager::find_config_file(home) {
        if !force {
            println!(
                "{} Configuration file already exists: {}",
                "⚠️".yellow(),
                existing.display()
            );
            return Ok(());
        }
    }

    let config_path = SettingsManager::default_config_path(home);
    ConfigManager::new()
        .save(&StudyConfig::default(), &config_path)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!("{}", "✅ Configuration initialized".green().bold());
    println!("  {}", config_path.display().to_string().cyan());
    Ok(())
}
