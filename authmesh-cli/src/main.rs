//! authmesh CLI
//!
//! Command-line front end for inspecting OAuth2 credentials and trying
//! them against real services.
//!
//! # Usage
//!
//! ```bash
//! # Show what a credentials file configures
//! authmesh inspect client_secret.json --scopes openid,email
//!
//! # List services configured through AUTHMESH_OAUTH_* variables
//! authmesh list-env
//!
//! # Run a password grant
//! authmesh token --creds app.json --username alice --password hunter2
//!
//! # GET a URL with a bearer token
//! authmesh fetch https://api.example.com/me --token-file token.json
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use authmesh_core::client::{new_client_bearer_token_simple_or_json, new_client_password};
use authmesh_core::credentials::{DEFAULT_SCOPES_ENV, parse_from_env_with, split_scopes};
use authmesh_core::{ConfigMoreSet, OAuth2Config, parse_from_file};

mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "authmesh")]
#[command(about = "Multi-provider OAuth2 credential management")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the OAuth2 configuration held in a credentials document
    Inspect {
        /// Credentials file; reads the configured environment variable when omitted
        file: Option<PathBuf>,

        /// OAuth scopes to request (comma-separated)
        #[arg(short, long)]
        scopes: Option<String>,
    },

    /// List services configured through environment variables
    ListEnv {
        /// Variable name pattern (defaults to the configured prefix)
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Obtain a token with the password grant
    Token {
        /// Credentials file for the OAuth2 application
        #[arg(long)]
        creds: PathBuf,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// OAuth scopes to request (comma-separated)
        #[arg(short, long)]
        scopes: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// GET a URL using a bearer token or JSON token document
    Fetch {
        url: String,

        /// Token value or JSON token document
        #[arg(long, conflicts_with = "token_file", required_unless_present = "token_file")]
        token: Option<String>,

        /// File holding the token value or JSON token document
        #[arg(long)]
        token_file: Option<PathBuf>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.log_level);
    debug!("Loaded configuration from {:?}", config.config_path);

    match cli.command {
        Commands::Inspect { file, scopes } => inspect(&config, file.as_deref(), scopes.as_deref()),
        Commands::ListEnv { prefix } => list_env(&config, prefix.as_deref()),
        Commands::Token {
            creds,
            username,
            password,
            scopes,
            format,
        } => token(&config, &creds, &username, &password, scopes.as_deref(), format).await,
        Commands::Fetch {
            url,
            token,
            token_file,
            insecure,
        } => fetch(&config, &url, token, token_file.as_deref(), insecure).await,
    }
}

fn init_logging(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(level)
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Process environment, with the default scopes variable mapped to the
/// configured one.
fn env_lookup(config: &CliConfig) -> impl Fn(&str) -> Option<String> + '_ {
    move |name: &str| {
        let name = if name == DEFAULT_SCOPES_ENV {
            config.scopes_env.as_str()
        } else {
            name
        };
        std::env::var(name).ok()
    }
}

/// Load credentials from `file`, or from the configured credentials variable.
///
/// Without `--scopes`, scopes come from the configured scopes variable.
fn load_credentials(
    config: &CliConfig,
    file: Option<&Path>,
    scopes: Option<&str>,
) -> Result<OAuth2Config> {
    let lookup = env_lookup(config);
    let scopes = scopes.map(split_scopes).unwrap_or_default();

    match file {
        Some(path) => {
            let scopes = if scopes.is_empty() {
                split_scopes(&lookup(DEFAULT_SCOPES_ENV).unwrap_or_default())
            } else {
                scopes
            };
            parse_from_file(path, &scopes)
                .with_context(|| format!("Failed to load credentials from {:?}", path))
        }
        None => parse_from_env_with(&lookup, &config.credentials_env, &scopes)
            .with_context(|| format!("Failed to load credentials from ${}", config.credentials_env)),
    }
}

fn inspect(config: &CliConfig, file: Option<&Path>, scopes: Option<&str>) -> Result<()> {
    let oauth = load_credentials(config, file, scopes)?;

    println!("Client ID:     {}", oauth.client_id);
    println!("Client secret: {}", oauth.client_secret);
    println!("Auth URL:      {}", oauth.endpoint.auth_url);
    println!("Token URL:     {}", oauth.endpoint.token_url);
    println!("Scopes:        {}", oauth.scopes.join(","));
    if let Some(redirect) = &oauth.redirect_url {
        println!("Redirect URL:  {}", redirect);
    }
    Ok(())
}

fn list_env(config: &CliConfig, prefix: Option<&str>) -> Result<()> {
    let prefix = prefix.unwrap_or(&config.env_prefix);
    let set = ConfigMoreSet::new();
    set.populate_from_env(std::env::vars(), prefix)
        .with_context(|| format!("Failed to load configs for prefix '{}'", prefix))?;

    if set.is_empty() {
        println!("No services configured for prefix '{}'", prefix);
        return Ok(());
    }

    println!("Configured services:");
    for key in set.keys() {
        let credentials = set.get(&key)?;
        println!("  {}  (client id: {})", key, credentials.client_id);
    }
    Ok(())
}

async fn token(
    config: &CliConfig,
    creds: &Path,
    username: &str,
    password: &str,
    scopes: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let oauth = load_credentials(config, Some(creds), scopes)?;

    info!(client_id = %oauth.client_id, "Requesting token with password grant");
    let client = new_client_password(&oauth, username, password, &config.client_options()).await?;
    let Some(token) = client.token().await else {
        bail!("Token endpoint returned no token");
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&token)?),
        OutputFormat::Text => {
            println!("{}", token.access_token.expose());
            if let Some(expiry) = token.expires_at() {
                println!("Expires: {}", expiry.to_rfc3339());
            }
        }
    }
    Ok(())
}

async fn fetch(
    config: &CliConfig,
    url: &str,
    token: Option<String>,
    token_file: Option<&Path>,
    insecure: bool,
) -> Result<()> {
    let token = match (token, token_file) {
        (Some(token), _) => token.into_bytes(),
        (None, Some(path)) => std::fs::read(path)
            .with_context(|| format!("Failed to read token from {:?}", path))?,
        (None, None) => bail!("Either --token or --token-file is required"),
    };

    let mut options = config.client_options();
    options.tls_insecure_skip_verify |= insecure;

    let client = new_client_bearer_token_simple_or_json(&token, &options)?;
    let response = client.get(url).await?.send().await?;

    let status = response.status();
    println!("{}", status);
    println!("{}", response.text().await?);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}
