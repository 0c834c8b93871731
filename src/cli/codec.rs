//! Кодирование и декодирование Z85 / hex

use std::io::{self, Write};

use anyhow::{Context, Result};
use sealkit::encode;

use super::{read_input, read_text};

/// Пробельные символы, допустимые внутри hex-строки
const HEX_IGNORE: &str = " \t\r\n:";

pub fn encode(text: Option<String>, hex: bool, safe: bool) -> Result<()> {
    let data = read_input(text)?;

    let encoded = if hex {
        encode::bin_to_hex(&data)
    } else if safe {
        encode::safe_bin_to_z85(&data).context("длина данных должна быть кратна 4")?
    } else {
        encode::bin_to_z85(&data)
    };

    println!("{}", encoded);
    Ok(())
}

pub fn decode(text: Option<String>, hex: bool, safe: bool) -> Result<()> {
    let text = read_text(text)?;

    let decoded = if hex {
        encode::hex_to_bin(&text, HEX_IGNORE).context("некорректная hex-строка")?
    } else if safe {
        encode::safe_z85_to_bin(&text).context("некорректная строка Z85")?
    } else {
        encode::z85_to_bin(&text).context("некорректная строка Z85 с дополнением")?
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(&decoded)?;
    stdout.flush()?;
    Ok(())
}
