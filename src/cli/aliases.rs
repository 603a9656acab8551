use tracing::instrument;

use super::Context;

mod add;
mod list;

#[derive(Debug, clap::Parser)]
pub struct Aliases {
    #[command(subcommand)]
    command: AliasesCommand,
}

#[derive(Debug, clap::Parser)]
enum AliasesCommand {
    /// List the built-in and configured alias tables
    List(list::Command),

    /// Add match phrases for a code to the configuration file
    Add(add::Command),
}

impl Aliases {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        match self.command {
            AliasesCommand::List(list) => list.run(context),
            AliasesCommand::Add(add) => add.run(context.config(), context.config_path()),
        }
    }
}
