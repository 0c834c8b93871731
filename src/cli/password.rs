//! Хеширование и проверка паролей

use std::io::Write;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use secrecy::ExposeSecret;

use sealkit::config::Settings;
use sealkit::{ops, CryptoError, PasswordHash};

use super::{prompt_new_password, prompt_password};

pub fn hash(settings: &Settings) -> Result<()> {
    println!("{}", "Хеширование пароля".cyan().bold());
    let password = prompt_new_password()?;
    println!();

    print!("{}", "Вычисление хеша (это займёт некоторое время)... ".cyan());
    std::io::stdout().flush()?;

    // PasswordHash wipes the copy it is given; `password` wipes itself on drop
    let mut copy = password.expose_secret().clone();
    let hash = PasswordHash::<ops::PwHashStr>::new(&mut copy, &settings.pwhash)
        .context("не удалось вычислить хеш пароля")?;
    println!("{}", "готово".green());

    println!();
    println!("{}", hash.as_str());
    Ok(())
}

pub fn verify(encoded: &str) -> Result<()> {
    let stored = PasswordHash::<ops::PwHashStr>::from_encoded(encoded)
        .context("некорректная длина хеша")?;
    let password = prompt_password()?;

    let mut copy = password.expose_secret().clone();
    match stored.verify(&mut copy) {
        Ok(()) => {
            println!("{}", "Пароль верный".green().bold());
            Ok(())
        }
        Err(CryptoError::Verification) => bail!("неверный пароль"),
        Err(CryptoError::Format) => bail!("строка не является хешем Argon2"),
        Err(e) => Err(e.into()),
    }
}
