//! Генерация ключей

use anyhow::{bail, Result};
use colored::Colorize;
use zeroize::Zeroizing;

use sealkit::encode;
use sealkit::operation::{KeyPairOp, Operation, SecretKeyOp};
use sealkit::ops;
use sealkit::{KeyPair, SecretKey};

struct Material {
    public: Option<String>,
    secret: Zeroizing<String>,
}

fn secret<O: SecretKeyOp>() -> Result<Material> {
    let key = SecretKey::<O>::generate()?;
    let secret = Zeroizing::new(encode::safe_bin_to_z85(&key.expose()?)?);
    Ok(Material {
        public: None,
        secret,
    })
}

fn pair<O: KeyPairOp>() -> Result<Material> {
    let pair = KeyPair::<O>::generate()?;
    let public = encode::safe_bin_to_z85(pair.public_key().as_bytes())?;
    let secret = Zeroizing::new(encode::safe_bin_to_z85(&pair.secret_key().expose()?)?);
    Ok(Material {
        public: Some(public),
        secret,
    })
}

pub fn run(operation: Operation) -> Result<()> {
    let material = match operation {
        Operation::SignEd25519 => pair::<ops::SignEd25519>()?,
        Operation::BoxCurve25519XChacha20Poly1305 => pair::<ops::BoxCurve25519XChacha20Poly1305>()?,
        Operation::DiffieHellmanX25519 => pair::<ops::DiffieHellmanX25519>()?,
        Operation::ShortHashSipHash24 => secret::<ops::ShortHashSipHash24>()?,
        Operation::GenericHashBlake3 => secret::<ops::GenericHashBlake3>()?,
        Operation::AuthHmacSha256 => secret::<ops::AuthHmacSha256>()?,
        Operation::AuthHmacSha512 => secret::<ops::AuthHmacSha512>()?,
        Operation::AuthHmacSha512256 => secret::<ops::AuthHmacSha512256>()?,
        Operation::SecretBoxXChacha20Poly1305 => secret::<ops::SecretBoxXChacha20Poly1305>()?,
        Operation::StreamChacha20 => secret::<ops::StreamChacha20>()?,
        Operation::StreamChacha20Ietf => secret::<ops::StreamChacha20Ietf>()?,
        Operation::StreamXChacha20 => secret::<ops::StreamXChacha20>()?,
        Operation::AeadAes256Gcm => secret::<ops::AeadAes256Gcm>()?,
        Operation::AeadChacha20Poly1305Ietf => secret::<ops::AeadChacha20Poly1305Ietf>()?,
        Operation::AeadXChacha20Poly1305Ietf => secret::<ops::AeadXChacha20Poly1305Ietf>()?,
        Operation::HashSha256
        | Operation::HashSha512
        | Operation::PwHashArgon2id
        | Operation::PwHashStrArgon2id => {
            bail!("операция {} не использует ключи", operation)
        }
    };

    if !operation.is_available() {
        println!(
            "{} аппаратное ускорение для {} недоступно, используется программная реализация",
            "Внимание:".yellow().bold(),
            operation
        );
    }

    println!();
    if let Some(public) = &material.public {
        println!("{}", "Публичный ключ (Z85):".cyan().bold());
        println!("{}", public);
        println!();
    }
    println!("{}", "Секретный ключ (Z85):".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", material.secret.as_str());
    println!("{}", "─".repeat(60).dimmed());
    println!();
    println!("{}", "Не передавайте секретный ключ третьим лицам.".yellow());

    Ok(())
}
