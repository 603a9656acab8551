use clap::Parser;
use tenders::{LineItem, TenderId, TenderRecord, domain::due_date};
use tracing::instrument;

use super::{Context, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Display every field of one tender")]
pub struct Show {
    /// The identifier of the tender to display
    tender_id: TenderId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip_all, fields(tender_id = %self.tender_id))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let session = context.session()?;

        let Some(tender) = session.find(&self.tender_id) else {
            eprintln!("Tender {} not found", self.tender_id);
            std::process::exit(1);
        };

        match self.output {
            OutputFormat::Pretty => output_pretty(tender),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tender)?),
        }

        Ok(())
    }
}

fn output_pretty(tender: &TenderRecord) {
    println!("# {}", tender.tender_id);
    if !tender.title().is_empty() {
        println!("{}", tender.title());
    }
    println!();

    println!("{}", "Details".dim());
    let due = tender.due_date.as_ref().map(due_date::format_timestamp);
    let fields = [
        ("Organisation", tender.organisation.as_deref()),
        ("City", tender.city.as_deref()),
        ("Category", Some(tender.category_label()).filter(|c| !c.is_empty())),
        ("Material", tender.material.as_deref()),
        ("Cable type", tender.cable_type.as_deref()),
        ("Due", due.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            println!("  {:<13}{value}", format!("{label}:"));
        }
    }

    if !tender.cable_requirements.is_empty() {
        println!("\n{}", "Line items".dim());
        for (index, item) in tender.cable_requirements.iter().enumerate() {
            println!("  {}. {}", index + 1, describe(item));
        }
    }
}

/// One-line summary of a line item, skipping absent fields.
fn describe(item: &LineItem) -> String {
    let labels = ["", "", "conductor ", "size ", "cores ", "insulation "];
    let parts: Vec<String> = labels
        .iter()
        .zip(item.fields())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{label}{}", value.trim()))
        .collect();

    if parts.is_empty() {
        "(no details)".to_string()
    } else {
        parts.join(", ")
    }
}
