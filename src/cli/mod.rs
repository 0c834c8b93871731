//! Реализация CLI команд

pub mod codec;
pub mod config;
pub mod keygen;
pub mod password;
pub mod traits;

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};

/// Минимальная длина пароля
pub const MIN_PASSWORD_LEN: usize = 12;

/// Запросить новый пароль с подтверждением
pub fn prompt_new_password() -> Result<SecretString> {
    println!("Минимальная длина: {} символов\n", MIN_PASSWORD_LEN);

    loop {
        let password = SecretString::new(rpassword::prompt_password("Введите пароль: ")?);

        if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
            println!(
                "{} Пароль должен содержать минимум {} символов",
                "Ошибка:".red(),
                MIN_PASSWORD_LEN
            );
            continue;
        }

        let confirm = SecretString::new(rpassword::prompt_password("Подтвердите пароль: ")?);

        if password.expose_secret() != confirm.expose_secret() {
            println!("{} Пароли не совпадают", "Ошибка:".red());
            continue;
        }

        return Ok(password);
    }
}

/// Запросить существующий пароль
pub fn prompt_password() -> Result<SecretString> {
    let password = rpassword::prompt_password("Введите пароль: ")?;
    Ok(SecretString::new(password))
}

/// Аргумент командной строки или содержимое stdin
pub fn read_input(text: Option<String>) -> Result<Vec<u8>> {
    if let Some(text) = text {
        return Ok(text.into_bytes());
    }
    let mut data = Vec::new();
    io::stdin()
        .read_to_end(&mut data)
        .context("не удалось прочитать stdin")?;
    Ok(data)
}

/// Текстовый ввод без завершающего перевода строки
pub fn read_text(text: Option<String>) -> Result<String> {
    let data = read_input(text)?;
    let Ok(text) = String::from_utf8(data) else {
        bail!("ввод не является текстом UTF-8");
    };
    Ok(text.trim_end_matches(['\r', '\n']).to_string())
}

/// Запросить подтверждение да/нет
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}
