use std::path::Path;

use tenders::{AliasKind, Config};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Which table to extend
    #[arg(value_enum)]
    kind: AliasKind,

    /// The code, as passed to --category or --cable-type (e.g. solar)
    code: String,

    /// Raw-text spellings the code should match (e.g. "Solar Modules")
    #[arg(num_args = 1.., required = true)]
    phrases: Vec<String>,
}

impl Command {
    /// Adds the phrases to `config` and writes it to `config_path`.
    ///
    /// The file is created if it does not exist yet; nothing is written when
    /// every phrase was already configured.
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config, config_path: &Path) -> anyhow::Result<()> {
        let code = self.code.trim();
        if code.is_empty() {
            anyhow::bail!("alias code must not be empty");
        }

        let mut config = config.clone();
        let mut added = Vec::new();
        let mut already_exists = Vec::new();

        for phrase in self.phrases {
            let phrase = phrase.trim();
            if phrase.is_empty() {
                anyhow::bail!("alias phrases must not be empty");
            }

            if config.add_alias(self.kind, code, phrase.to_string()) {
                added.push(phrase.to_string());
            } else {
                already_exists.push(phrase.to_string());
            }
        }

        if !added.is_empty() {
            config.save(config_path).map_err(anyhow::Error::msg)?;
            tracing::info!(kind = %self.kind, code, "saved {}", config_path.display());

            println!(
                "{}",
                format!(
                    "Added {} {} alias(es) for '{code}': {}",
                    added.len(),
                    self.kind,
                    added.join(", ")
                )
                .success()
            );
        }

        if !already_exists.is_empty() {
            println!(
                "{}",
                format!("Already configured: {}", already_exists.join(", ")).dim()
            );
        }

        Ok(())
    }
}
