mod crypt_commands;
mod fetch_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    gantry_config::GantryConfig,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "gantry", about = "Gantry: retrying HTTP client and crypto toolkit", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/gantry/).
    #[arg(long, global = true, env = "GANTRY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an HTTP request through the configured retry tripperware.
    Fetch(fetch_commands::FetchArgs),
    /// Generate a random key for a common-key algorithm.
    Keygen(crypt_commands::KeygenArgs),
    /// Encrypt data with a common-key algorithm.
    Encrypt(crypt_commands::CipherArgs),
    /// Decrypt data produced by `encrypt`.
    Decrypt(crypt_commands::CipherArgs),
    /// Hash a password with the configured password hasher.
    Hash(crypt_commands::HashArgs),
    /// Check a password against a hash produced by `hash`.
    Compare(crypt_commands::CompareArgs),
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries command output.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GantryConfig> {
    match path {
        Some(path) => gantry_config::load_config(path),
        None => Ok(gantry_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "gantry starting");

    let config = load_config(cli.config.as_ref())?;
    debug!(
        retry = config.retry.is_some(),
        password = config.password.is_some(),
        encryption = ?config.encryption,
        "config loaded"
    );

    match cli.command {
        Commands::Fetch(args) => fetch_commands::handle_fetch(args, &config).await,
        Commands::Keygen(args) => crypt_commands::handle_keygen(args, &config),
        Commands::Encrypt(args) => crypt_commands::handle_encrypt(args, &config),
        Commands::Decrypt(args) => crypt_commands::handle_decrypt(args, &config),
        Commands::Hash(args) => crypt_commands::handle_hash(args, &config),
        Commands::Compare(args) => crypt_commands::handle_compare(args, &config),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, gantry_config::CommonKeyAlg};

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "encryption = \"aes_ctr\"\n\n[retry]\nmax_retry = 3\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.encryption, Some(CommonKeyAlg::AesCtr));
        assert_eq!(config.retry.unwrap().max_retry, 3);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gantry", "keygen", "--alg", "aes_gcm", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Keygen(_)));
    }
}
