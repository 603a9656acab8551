use std::{cmp::Ordering, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use regex::Regex;
use tenders::{FilterSpec, StageReport, TenderRecord, domain::due_date};
use tracing::instrument;

use super::{
    Context,
    terminal::{self, Colorize},
};

/// Widest a title cell may get in the table view.
const TITLE_WIDTH: usize = 60;

/// Command arguments for `tender search`.
#[derive(Debug, Parser)]
#[command(about = "Search tenders with filters")]
pub struct Search {
    /// Words that must all occur in the tender (title, material,
    /// organisation, cable types, city, line items).
    #[arg(long, short_alias = 'k')]
    keyword: Option<String>,

    /// Category code, e.g. wires-cables, transformers, fmcg-packaging.
    #[arg(long)]
    category: Option<String>,

    /// Cable type code, e.g. ht-cable, lt-cable, control-cable.
    #[arg(long)]
    cable_type: Option<String>,

    /// Voltage grade, e.g. 11 or 11kV.
    #[arg(long)]
    voltage: Option<String>,

    /// Case-insensitive part of the city name.
    #[arg(long)]
    city: Option<String>,

    /// Only tenders due on or before this date (YYYY-MM-DD).
    #[arg(long, value_parser = due_date::parse_filter_date)]
    due_date: Option<String>,

    /// Read filters from a JSON file; flags given on the command line win.
    #[arg(long, value_name = "FILE")]
    spec: Option<PathBuf>,

    /// Regular expression the title or organisation must match.
    #[arg(long)]
    regex: Option<String>,

    /// Columns to display (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "COL")]
    columns: Vec<Column>,

    /// Row order (default: as loaded).
    #[arg(long, value_enum, default_value_t)]
    sort: SortField,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,

    /// Report how many tenders each filter stage kept (on stderr).
    #[arg(long)]
    explain: bool,

    /// Limit number of rows returned (0 = configured default).
    #[arg(long)]
    limit: Option<usize>,

    /// Skip the first N rows.
    #[arg(long)]
    offset: Option<usize>,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Row orderings. None of them ranks by relevance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum SortField {
    /// Keep the order the tenders were loaded in.
    #[default]
    Input,
    /// Earliest due date first; undated tenders last.
    Due,
    /// By tender id.
    Id,
}

/// Available table columns.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum)]
pub enum Column {
    Id,
    Title,
    Organisation,
    City,
    Category,
    CableType,
    Items,
    Due,
}

impl Search {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let spec = self.filter_spec()?;
        let regex = self
            .regex
            .as_deref()
            .map(|pattern| Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}")))
            .transpose()?;

        let session = context.session()?;
        let outcome = session.search_with_report(&spec);

        if self.explain {
            render_report(session.tenders().len(), &outcome.stages);
        }

        let mut rows = outcome.records;
        if let Some(regex) = &regex {
            rows.retain(|tender| {
                regex.is_match(tender.title())
                    || regex.is_match(tender.organisation.as_deref().unwrap_or_default())
            });
        }

        let matched = rows.len();
        rows = apply_sort(rows, self.sort);

        let limit = self
            .limit
            .filter(|&value| value > 0)
            .unwrap_or_else(|| context.config().limit());
        rows = apply_offset_limit(rows, self.offset, limit);

        match self.output {
            OutputFormat::Table => {
                render_table(&rows, &self.columns, self.quiet);
                if !self.quiet {
                    render_summary(rows.len(), matched);
                }
                Ok(())
            }
            OutputFormat::Json => render_json(&rows),
            OutputFormat::Csv => {
                render_csv(&rows, &self.columns, self.quiet);
                Ok(())
            }
        }
    }

    /// Filters from the flags, with blanks filled from `--spec`.
    fn filter_spec(&self) -> anyhow::Result<FilterSpec> {
        let flags = FilterSpec {
            keyword: self.keyword.clone(),
            category: self.category.clone(),
            cable_type: self.cable_type.clone(),
            voltage: self.voltage.clone(),
            city: self.city.clone(),
            due_date: self.due_date.clone(),
        };

        let Some(path) = &self.spec else {
            return Ok(flags);
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read filter spec {}", path.display()))?;
        let from_file: FilterSpec = serde_json::from_str(&content)
            .with_context(|| format!("invalid filter spec {}", path.display()))?;

        Ok(flags.or(from_file))
    }
}

fn render_report(total: usize, stages: &[StageReport]) {
    eprintln!("{}", format!("{total} tenders loaded").dim());
    for report in stages {
        let dropped = report.before - report.after;
        eprintln!(
            "{}",
            format!(
                "  {:<10} {:>6} -> {:<6} (-{dropped})",
                report.stage.to_string(),
                report.before,
                report.after
            )
            .dim()
        );
    }
}

fn render_summary(shown: usize, matched: usize) {
    let line = if matched == 0 {
        "No tenders matched".warning()
    } else if shown < matched {
        format!("{shown} of {matched} matching tenders shown").success()
    } else {
        format!("{matched} matching tenders").success()
    };
    println!("\n{line}");
}

fn apply_sort(mut rows: Vec<TenderRecord>, sort: SortField) -> Vec<TenderRecord> {
    match sort {
        SortField::Input => {}
        // stable sorts keep load order among equals
        SortField::Due => rows.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortField::Id => rows.sort_by(|a, b| a.tender_id.cmp(&b.tender_id)),
    }
    rows
}

fn apply_offset_limit(
    mut rows: Vec<TenderRecord>,
    offset: Option<usize>,
    limit: usize,
) -> Vec<TenderRecord> {
    if let Some(off) = offset {
        if off < rows.len() {
            rows.drain(..off);
        } else {
            rows.clear();
        }
    }

    rows.truncate(limit);
    rows
}

fn selected_columns(columns: &[Column], quiet: bool) -> Vec<Column> {
    if !columns.is_empty() {
        return columns.to_vec();
    }
    if quiet {
        vec![Column::Id]
    } else if terminal::is_narrow() {
        vec![Column::Id, Column::Title, Column::Due]
    } else {
        vec![
            Column::Id,
            Column::Title,
            Column::City,
            Column::Category,
            Column::CableType,
            Column::Items,
            Column::Due,
        ]
    }
}

fn render_table(rows: &[TenderRecord], columns: &[Column], quiet: bool) {
    let selected_columns = selected_columns(columns, quiet);

    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|tender| {
            selected_columns
                .iter()
                .map(|column| match column {
                    Column::Title if !quiet => terminal::truncate(&column.value(tender), TITLE_WIDTH),
                    _ => column.value(tender),
                })
                .collect()
        })
        .collect();

    if quiet {
        for row in data {
            println!("{}", row.join("\t"));
        }
        return;
    }

    let headers: Vec<&str> = selected_columns.iter().map(|c| c.header()).collect();

    // Determine column widths for alignment.
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}

fn render_json(rows: &[TenderRecord]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

fn render_csv(rows: &[TenderRecord], columns: &[Column], quiet: bool) {
    let selected_columns = if columns.is_empty() {
        vec![
            Column::Id,
            Column::Title,
            Column::Organisation,
            Column::City,
            Column::Category,
            Column::CableType,
            Column::Items,
            Column::Due,
        ]
    } else {
        columns.to_vec()
    };

    if !quiet {
        let header_line = selected_columns
            .iter()
            .map(|column| csv_escape(column.header()))
            .collect::<Vec<_>>()
            .join(",");
        println!("{header_line}");
    }

    for tender in rows {
        let values = selected_columns
            .iter()
            .map(|column| csv_escape(&column.value(tender)))
            .collect::<Vec<_>>();
        println!("{}", values.join(","));
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

impl Column {
    const fn header(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "Title",
            Self::Organisation => "Organisation",
            Self::City => "City",
            Self::Category => "Category",
            Self::CableType => "Cable Type",
            Self::Items => "Items",
            Self::Due => "Due",
        }
    }

    fn value(self, tender: &TenderRecord) -> String {
        match self {
            Self::Id => tender.tender_id.to_string(),
            Self::Title => tender.title().to_string(),
            Self::Organisation => tender.organisation.clone().unwrap_or_default(),
            Self::City => tender.city().to_string(),
            Self::Category => tender.category_label().to_string(),
            Self::CableType => cable_types(tender),
            Self::Items => tender.cable_requirements.len().to_string(),
            Self::Due => tender
                .due_date
                .as_ref()
                .map(due_date::format_timestamp)
                .unwrap_or_default(),
        }
    }
}

/// The primary cable type followed by any distinct line-item cable types.
fn cable_types(tender: &TenderRecord) -> String {
    let mut types: Vec<&str> = Vec::new();
    let primary = tender.cable_type.as_deref();
    let items = tender
        .cable_requirements
        .iter()
        .map(|item| item.cable_type.as_deref());

    for cable_type in std::iter::once(primary).chain(items).flatten() {
        let cable_type = cable_type.trim();
        if !cable_type.is_empty() && !types.contains(&cable_type) {
            types.push(cable_type);
        }
    }
    types.join(", ")
}
