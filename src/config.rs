use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::session::Role;
use crate::bugs::models::{BugStatus, Priority};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Parser, Debug)]
#[command(name = "bugtrack", about = "Command-line client for the bug tracker", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the bug tracker API
    #[arg(long, env = "BUGTRACK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BUGTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BUGTRACK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "developer")]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List developers bugs can be assigned to
    Developers,
    /// Check where the guard sends the current session for a path
    Route { path: String },
    #[command(subcommand)]
    Bugs(BugsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BugsCommand {
    /// List bugs visible to you
    List {
        #[arg(long)]
        status: Option<BugStatus>,
        #[arg(long)]
        search: Option<String>,
        /// Only bugs assigned to you
        #[arg(long)]
        mine: bool,
    },
    Show {
        id: String,
    },
    /// Report a new bug
    Report {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// Change a bug's status
    Status {
        id: String,
        status: BugStatus,
    },
    Assign {
        id: String,
        developer_id: String,
    },
    /// Edit title, description or priority
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    Delete {
        id: String,
    },
}

impl Command {
    /// The route a command stands in for, checked by the guard before it
    /// runs. `None` for commands that work in any session state.
    pub fn route_path(&self) -> Option<String> {
        match self {
            Command::Login { .. } => Some("/login".into()),
            Command::Register { .. } => Some("/register".into()),
            Command::Logout | Command::Whoami | Command::Route { .. } => None,
            Command::Developers => Some("/bugs".into()),
            Command::Bugs(cmd) => Some(match cmd {
                BugsCommand::List { .. } => "/bugs".into(),
                BugsCommand::Report { .. } => "/bugs/new".into(),
                BugsCommand::Show { id }
                | BugsCommand::Status { id, .. }
                | BugsCommand::Assign { id, .. }
                | BugsCommand::Update { id, .. }
                | BugsCommand::Delete { id } => format!("/bugs/{}", id),
            }),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub session_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        if let Some(ref url) = cli.api_url {
            config.api.base_url = url.clone();
        }

        if config.storage.session_file.is_none() {
            config.storage.session_file = Some(data_dir.join("session.json"));
        }
        config.data_dir = data_dir;

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| match dirs::home_dir() {
            Some(home) => home.join(".bugtrack"),
            None => {
                tracing::warn!("Could not determine home directory, using ./.bugtrack");
                PathBuf::from(".bugtrack")
            }
        })
    }

    pub fn session_path(&self) -> PathBuf {
        self.storage
            .session_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("session.json"))
    }
}
