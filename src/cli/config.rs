//! Просмотр и создание файла конфигурации

use anyhow::{Context, Result};
use colored::Colorize;

use sealkit::config::{self, Settings};

use super::confirm;

pub fn show(settings: &Settings) -> Result<()> {
    let path = config::config_path()?;
    let source = if path.exists() {
        path.display().to_string()
    } else {
        "значения по умолчанию".to_string()
    };

    println!("{} {}", "Источник:".cyan().bold(), source);
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = config::config_path()?;

    if path.exists() && !force {
        println!(
            "{} файл {} уже существует.",
            "Внимание:".yellow().bold(),
            path.display()
        );
        if !confirm("Перезаписать значениями по умолчанию?") {
            println!("Отменено.");
            return Ok(());
        }
    }

    Settings::default()
        .save_to(&path)
        .with_context(|| format!("не удалось записать {}", path.display()))?;
    println!("{} {}", "Конфигурация записана:".green(), path.display());
    Ok(())
}
