use clap::{ArgGroup, Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "clean-my-web.yaml";
pub const DEFAULT_STORE_PATH: &str = "cmw-store.json";
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "clean-my-web",
    version,
    about = "Hide unwanted page elements per site and re-hide them on every visit"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: clean-my-web.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// JSON file holding the hidden elements of every site
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Append a JSONL resolution journal to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hide every stored element of a site on a page
    #[command(group(ArgGroup::new("source").required(true).args(["html", "url"])))]
    Apply {
        /// Hostname whose stored elements are applied (default: from --url)
        #[arg(long)]
        host: Option<String>,

        /// Local HTML file
        #[arg(long)]
        html: Option<String>,

        /// Fetch the page over HTTP
        #[arg(long)]
        url: Option<String>,

        /// Write the resulting HTML here
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Describe one element and optionally store it as hidden
    #[command(group(ArgGroup::new("target").required(true).args(["xpath", "selector"])))]
    Describe {
        #[arg(long)]
        host: String,

        #[arg(long)]
        html: String,

        #[arg(long)]
        xpath: Option<String>,

        #[arg(long)]
        selector: Option<String>,

        /// Store the descriptor for the host
        #[arg(long)]
        save: bool,
    },

    /// Replay a selection-session script
    Select {
        /// Script YAML file
        #[arg(long)]
        script: String,

        /// HTML file to run against (overrides the script's page)
        #[arg(long)]
        html: Option<String>,
    },

    /// List every site with stored elements
    Sites,

    /// Forget one stored element of a site
    Show {
        #[arg(long)]
        host: String,

        /// Element key as printed by `sites` / `describe`
        #[arg(long)]
        key: String,
    },

    /// Delete a site's stored elements, or every site's
    #[command(group(ArgGroup::new("scope").required(true).args(["host", "all"])))]
    Reset {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        all: bool,
    },

    /// Stop applying stored elements on a site
    Disable {
        #[arg(long)]
        host: String,
    },

    /// Resume applying stored elements on a site
    Enable {
        #[arg(long)]
        host: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `clean-my-web.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub apply: ApplyConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyConfig {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

fn default_store_path() -> String { DEFAULT_STORE_PATH.to_string() }
fn default_settle_delay_ms() -> u64 { DEFAULT_SETTLE_DELAY_MS }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Values in effect after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: String,
    pub trace_path: Option<String>,
    pub settle_delay_ms: u64,
}

impl Settings {
    /// CLI flag > config file > default.
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Self {
        Self {
            store_path: cli
                .store
                .clone()
                .unwrap_or_else(|| config.store.path.clone()),
            trace_path: cli.trace.clone().or_else(|| config.trace.path.clone()),
            settle_delay_ms: config.apply.settle_delay_ms,
        }
    }
}
