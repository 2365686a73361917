use brain_bridge::config::{BridgeConfig, ConfigError, Settings, load_settings};
use brain_bridge::context::{PrMetadata, prepare_context};
use brain_bridge::query::{DEFAULT_MAX_ACTIONS, query_next_actions, query_status};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Bridge between pull request reviews and a Brain MCP server
#[derive(Parser)]
#[command(name = "brain-bridge")]
#[command(version)]
#[command(about = "Bridge between pull request reviews and a Brain MCP server")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags layered over the configuration file
#[derive(Args)]
struct Overrides {
    /// Configuration file (default: <config dir>/brain-bridge/brain-bridge.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable the bridge regardless of the configuration file
    #[arg(long)]
    enable: bool,

    /// Brain MCP server binary
    #[arg(long)]
    mcp_bin: Option<PathBuf>,

    /// Data root exported to the server as BRAIN_ROOT
    #[arg(long)]
    mcp_root: Option<PathBuf>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Default slice name
    #[arg(long)]
    slice: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare review context for a pull request and print it as JSON
    Context {
        /// Repository root receiving BRAIN_QODO_CONTEXT.md
        #[arg(long)]
        repo: PathBuf,

        /// Pull request number
        #[arg(long)]
        pr: u64,

        #[arg(long, default_value = "")]
        head_sha: String,

        #[arg(long, default_value = "")]
        base_sha: String,

        /// Changed file, relative to the repository root (repeatable)
        #[arg(long = "changed-file")]
        changed_files: Vec<String>,
    },
    /// Print the codebase status overview as JSON
    Status,
    /// Print recommended next actions as JSON
    NextActions {
        /// Restrict actions to one slice
        #[arg(long = "slice")]
        slice_filter: Option<String>,

        /// Maximum number of actions
        #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
        max: usize,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Overrides {
    fn apply(&self, config: &mut BridgeConfig) {
        if self.enable {
            config.enable = true;
        }
        if let Some(bin) = &self.mcp_bin {
            config.mcp_bin = bin.clone();
        }
        if let Some(root) = &self.mcp_root {
            config.mcp_root = root.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(slice) = &self.slice {
            config.default_slice = slice.clone();
        }
    }
}

fn resolve_config(overrides: &Overrides) -> Result<BridgeConfig, ConfigError> {
    let mut config = load_settings(overrides.config.as_deref())?.brain;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to encode output: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let config = match resolve_config(&cli.overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Context {
            repo,
            pr,
            head_sha,
            base_sha,
            changed_files,
        } => {
            let metadata = PrMetadata {
                pr_number: pr,
                head_sha,
                base_sha,
                changed_files,
            };
            print_json(&prepare_context(&config, &metadata, &repo).await);
        }
        Commands::Status => {
            print_json(&query_status(&config).await);
        }
        Commands::NextActions { slice_filter, max } => {
            print_json(&query_next_actions(&config, slice_filter.as_deref(), max).await);
        }
        Commands::Config => {
            let settings = Settings { brain: config };
            match toml::to_string_pretty(&settings) {
                Ok(text) => print!("{}", text),
                Err(e) => {
                    eprintln!("Error: failed to encode configuration: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
