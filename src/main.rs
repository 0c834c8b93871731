use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

mod cli;

use sealkit::config::Settings;
use sealkit::Operation;

const LOG_ENV: &str = "SEALKIT_LOG";

#[derive(Parser)]
#[command(name = "sealkit")]
#[command(author = "Oleg")]
#[command(version = "0.1.0")]
#[command(about = "Ключи в защищённой памяти, кодек Z85 и запечатывание сообщений", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Закодировать данные в Z85
    Encode {
        /// Выводить hex вместо Z85
        #[arg(long)]
        hex: bool,
        /// Без дополнения: длина должна быть кратна 4
        #[arg(long)]
        safe: bool,
        /// Входные данные (по умолчанию читаются из stdin)
        text: Option<String>,
    },

    /// Декодировать Z85 в двоичные данные
    Decode {
        /// Входные данные в hex вместо Z85
        #[arg(long)]
        hex: bool,
        /// Без дополнения: длина должна быть кратна 5
        #[arg(long)]
        safe: bool,
        /// Входная строка (по умолчанию читается из stdin)
        text: Option<String>,
    },

    /// Сгенерировать ключ для операции
    Keygen {
        /// Имя операции, например sign_ed25519
        operation: Operation,
    },

    /// Показать размеры и возможности операций в JSON
    Traits {
        /// Имя операции (по умолчанию все)
        operation: Option<Operation>,
    },

    /// Вычислить хеш пароля для хранения
    Pwhash,

    /// Проверить пароль по сохранённому хешу
    Pwverify {
        /// Хеш в формате PHC ($argon2id$...)
        hash: String,
    },

    /// Управление конфигурацией
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Показать действующую конфигурацию
    Show,
    /// Записать конфигурацию по умолчанию
    Init {
        /// Перезаписать существующий файл
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!(
                "{} не удалось прочитать конфигурацию ({}), используются значения по умолчанию",
                "Внимание:".yellow().bold(),
                e
            );
            Settings::default()
        }
    };
    init_logging(&settings.log.level);
    if let Err(e) = settings.apply() {
        eprintln!("{} настройки не применены ({})", "Внимание:".yellow().bold(), e);
    }

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Ошибка:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, settings: &Settings) -> anyhow::Result<()> {
    match cli.command {
        Commands::Encode { hex, safe, text } => cli::codec::encode(text, hex, safe),
        Commands::Decode { hex, safe, text } => cli::codec::decode(text, hex, safe),
        Commands::Keygen { operation } => cli::keygen::run(operation),
        Commands::Traits { operation } => cli::traits::run(operation),
        Commands::Pwhash => cli::password::hash(settings),
        Commands::Pwverify { hash } => cli::password::verify(&hash),
        Commands::Config { action } => match action {
            ConfigCommands::Show => cli::config::show(settings),
            ConfigCommands::Init { force } => cli::config::init(force),
        },
    }
}
