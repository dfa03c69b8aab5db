//! llm-router - route prompts to a fast or high-quality LLM with fallback

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_router::{QualityTier, RouteRequestBody, RouterConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "llm-router")]
#[command(
    about = "Route prompts to a fast or high-quality LLM backend",
    long_about = "Picks a backend by quality tier, bounds each call with a deadline, and falls back from the fast backend to the high-quality one on the free tier"
)]
#[command(version)]
struct Args {
    /// Path to the config file (default: ~/.config/cli-programs/llm-router.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Route a single prompt and print the outcome as JSON
    Ask {
        /// The prompt to send
        prompt: String,

        /// Quality tier: free, cheap or best
        #[arg(short, long, default_value = "free")]
        quality: String,

        /// Token budget (16-2048)
        #[arg(long, default_value_t = 512)]
        max_tokens: i64,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.debug);

    // API keys may live in a .env next to the binary's working directory
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let config_path = match args.config {
        Some(path) => path,
        None => RouterConfig::config_path()?,
    };

    match args.command {
        Some(Commands::Config { action }) => handle_config_command(&action, &config_path),
        Some(Commands::Ask {
            prompt,
            quality,
            max_tokens,
        }) => ask(&config_path, prompt, quality, max_tokens).await,
        Some(Commands::Serve { host, port }) => serve(&config_path, host, port).await,
        None => serve(&config_path, None, None).await,
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if debug {
        builder.filter_module("llm_router", log::LevelFilter::Debug);
        builder.filter_module("llm_client", log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_config(path: &Path) -> Result<RouterConfig> {
    RouterConfig::load_from(path).context("Failed to load router configuration")
}

async fn serve(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let router = config.build_router()?;
    log::info!(
        "Backends: fast={} ({}s), quality={} ({}s)",
        config.routing.fast,
        config.routing.fast_timeout_secs,
        config.routing.quality,
        config.routing.quality_timeout_secs
    );

    llm_router::server::serve(&config.server, Arc::new(router)).await
}

async fn ask(config_path: &Path, prompt: String, quality: String, max_tokens: i64) -> Result<()> {
    let request = RouteRequestBody {
        prompt: Some(prompt),
        quality: Some(quality),
        max_tokens: Some(max_tokens),
    }
    .validate()?;

    let config = load_config(config_path)?;
    let router = config.build_router()?;

    let outcome = router.route(&request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn handle_config_command(action: &ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            println!("Config file: {}", config_path.display());
            println!();
            println!("Server:");
            println!("  Listen: {}", config.server.addr());
            println!("  Max body: {} bytes", config.server.max_body_bytes);
            println!();
            println!("Routing:");
            println!(
                "  Fast backend:    {} (deadline {}s)",
                config.routing.fast, config.routing.fast_timeout_secs
            );
            println!(
                "  Quality backend: {} (deadline {}s)",
                config.routing.quality, config.routing.quality_timeout_secs
            );
            for tier in [QualityTier::Free, QualityTier::Cheap, QualityTier::Best] {
                let plan = llm_router::BackendPlan::for_tier(tier);
                println!("  {:<5} -> {}", tier, plan);
            }
            println!();
            println!("Presets:");
            let mut names: Vec<_> = config.llm.presets.keys().collect();
            names.sort();
            for name in names {
                let preset = &config.llm.presets[name];
                let key_source = if config
                    .llm
                    .get_provider_config(&preset.provider)
                    .and_then(|p| p.api_key.as_ref())
                    .is_some()
                {
                    "config"
                } else {
                    "env"
                };
                println!(
                    "  {}: {} / {} (api key from {})",
                    name, preset.provider, preset.model, key_source
                );
            }
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    config_path.display()
                );
            }
            RouterConfig::default().save_to(config_path)?;
            println!("Wrote default config to {}", config_path.display());
        }
    }
    Ok(())
}
