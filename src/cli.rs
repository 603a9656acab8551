use std::path::{Path, PathBuf};

mod aliases;
mod search;
mod show;
mod terminal;

use aliases::Aliases;
use anyhow::Context as _;
use clap::ArgAction;
use search::Search;
use show::Show;
use tenders::{Config, Session};

/// Config file looked up in the working directory when `--config` is not given.
const DEFAULT_CONFIG: &str = "tenders.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file (default: ./tenders.toml if present)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON file of tenders (overrides `data` in the configuration)
    #[arg(short, long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let (config_path, config) = match self.config {
            Some(path) => {
                let config = Config::load(&path);
                (path, config)
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG);
                let config = Config::load_or_default(&path);
                (path, config)
            }
        };
        let config = config
            .map_err(anyhow::Error::msg)
            .context("failed to load configuration")?;

        let context = Context {
            data: self.data.or_else(|| config.data.clone()),
            config,
            config_path,
        };

        self.command.run(&context)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Search tenders with filters
    Search(Search),

    /// Show every field of one tender
    Show(Show),

    /// List or extend the category and cable type alias tables
    Aliases(Aliases),
}

impl Command {
    fn run(self, context: &Context) -> anyhow::Result<()> {
        match self {
            Self::Search(command) => command.run(context)?,
            Self::Show(command) => command.run(context)?,
            Self::Aliases(command) => command.run(context)?,
        }
        Ok(())
    }
}

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    config: Config,
    config_path: PathBuf,
    data: Option<PathBuf>,
}

impl Context {
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The file the configuration was read from, and is written back to.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the tender data into a session.
    ///
    /// A data file that fails to load yields an empty session (with a
    /// warning), but having no data file configured at all is an error.
    pub fn session(&self) -> anyhow::Result<Session> {
        let Some(path) = &self.data else {
            anyhow::bail!(
                "no tender data: pass --data <PATH> or set `data` in {DEFAULT_CONFIG}"
            );
        };
        Ok(Session::load_or_empty(path, &self.config))
    }
}
