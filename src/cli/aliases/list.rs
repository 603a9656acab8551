use clap::Parser;
use serde::Serialize;
use tenders::{AliasKind, AliasTables};
use tracing::instrument;

use crate::cli::{Context, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "List the codes accepted by --category and --cable-type")]
pub struct Command {
    /// Only show one table
    #[arg(long, value_enum)]
    kind: Option<AliasKind>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct TableView<'a> {
    kind: AliasKind,
    codes: Vec<CodeView<'a>>,
}

#[derive(Debug, Serialize)]
struct CodeView<'a> {
    code: &'a str,
    matches: &'a [String],
}

impl Command {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tables = context.config().alias_tables();
        let views = views(&tables, self.kind);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&views)?);
            return Ok(());
        }

        for (i, view) in views.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", view.kind.to_string().dim());
            for code in &view.codes {
                println!("  {:<24}{}", code.code, code.matches.join(" | "));
            }
        }
        Ok(())
    }
}

fn views(tables: &AliasTables, only: Option<AliasKind>) -> Vec<TableView<'_>> {
    [AliasKind::Category, AliasKind::CableType]
        .into_iter()
        .filter(|kind| only.is_none_or(|only| only == *kind))
        .map(|kind| TableView {
            kind,
            codes: tables
                .table(kind)
                .iter()
                .map(|(code, matches)| CodeView { code, matches })
                .collect(),
        })
        .collect()
}
