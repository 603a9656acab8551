//! The filter pipeline.
//!
//! A [`FilterSpec`] compiles into a [`Pipeline`] of independent stages. Each
//! enabled stage narrows the candidate records in turn, so a record survives
//! only if it passes every stage. Stages run in a fixed order (cheap substring
//! checks before date parsing) but commute: the order never changes the
//! result.
//!
//! Line items matter to three stages, with different rules:
//!
//! - keyword: line-item text is always part of the haystack;
//! - cable type: line items are checked after the primary `cable_type`, and
//!   `title`/`material` are consulted only when the record has no line items;
//! - voltage: `title`/`material` and line items are always both checked.
//!
//! The cable type and voltage rules are deliberately asymmetric. They were
//! tuned per field and are kept as they are until the product side decides
//! otherwise.
//!
//! The voltage filter is trimmed after every `kv` is stripped, so `11 kV`
//! searches for grade `11` and matches a title reading `11kV`. Without the
//! trim the grade would keep its trailing space and only match `11 kv`.

use std::{collections::BTreeSet, fmt};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{
    AliasKind, AliasTables, FilterSpec, TenderRecord, active, due_date,
    keyword::{self, Token},
};

/// A filter stage, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Every keyword token occurs in the record's text.
    Keyword,
    /// The category label contains a category alias.
    Category,
    /// A cable type field contains a cable type alias.
    CableType,
    /// The voltage grade occurs in the record.
    Voltage,
    /// The city contains the filter text.
    City,
    /// The record is due on or before the filter date.
    DueDate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyword => "keyword",
            Self::Category => "category",
            Self::CableType => "cable-type",
            Self::Voltage => "voltage",
            Self::City => "city",
            Self::DueDate => "due-date",
        })
    }
}

/// How many records one stage received and kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// The stage that ran.
    pub stage: Stage,
    /// Candidates entering the stage.
    pub before: usize,
    /// Candidates that passed it.
    pub after: usize,
}

/// The records that survived a search, with a report per enabled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Surviving records, in input order.
    pub records: Vec<TenderRecord>,
    /// One report per enabled stage, in application order.
    pub stages: Vec<StageReport>,
}

#[derive(Debug, Clone)]
enum Filter {
    Keyword(BTreeSet<Token>),
    Category(Vec<String>),
    CableType(Vec<String>),
    Voltage(String),
    City(String),
    /// `None` when the filter date could not be parsed; nothing matches.
    DueDate(Option<NaiveDateTime>),
}

/// A compiled [`FilterSpec`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    filters: Vec<Filter>,
}

impl Pipeline {
    /// Compiles `spec`, resolving codes through `aliases`.
    ///
    /// Fields that are empty after trimming produce no stage.
    #[must_use]
    pub fn new(spec: &FilterSpec, aliases: &AliasTables) -> Self {
        let mut filters = Vec::new();

        if let Some(keyword) = active(spec.keyword.as_deref()) {
            filters.push(Filter::Keyword(keyword::tokenize(keyword)));
        }

        if let Some(code) = active(spec.category.as_deref()) {
            filters.push(Filter::Category(needles(aliases, AliasKind::Category, code)));
        }

        if let Some(code) = active(spec.cable_type.as_deref()) {
            filters.push(Filter::CableType(needles(aliases, AliasKind::CableType, code)));
        }

        if let Some(voltage) = active(spec.voltage.as_deref()) {
            let grade = normalize_voltage(voltage);
            if grade.is_empty() {
                tracing::debug!(voltage, "voltage filter has no grade, skipping");
            } else {
                filters.push(Filter::Voltage(grade));
            }
        }

        if let Some(city) = active(spec.city.as_deref()) {
            filters.push(Filter::City(city.to_lowercase()));
        }

        if let Some(date) = active(spec.due_date.as_deref()) {
            let bound = due_date::end_of_day(date);
            if bound.is_none() {
                tracing::warn!(date, "unparseable due date filter matches no tenders");
            }
            filters.push(Filter::DueDate(bound));
        }

        Self { filters }
    }

    /// Whether no stage is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `record` passes every enabled stage.
    #[must_use]
    pub fn matches(&self, record: &TenderRecord) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    /// The records passing every enabled stage, in input order.
    #[must_use]
    pub fn apply(&self, records: &[TenderRecord]) -> Vec<TenderRecord> {
        self.run(records).records
    }

    /// Applies each stage as a narrowing pass and reports its effect.
    #[must_use]
    pub fn run(&self, records: &[TenderRecord]) -> SearchOutcome {
        let mut candidates: Vec<&TenderRecord> = records.iter().collect();
        let mut stages = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            let before = candidates.len();
            candidates.retain(|record| filter.matches(record));
            let report = StageReport {
                stage: filter.stage(),
                before,
                after: candidates.len(),
            };
            tracing::debug!(
                stage = %report.stage,
                before = report.before,
                after = report.after,
                "applied filter stage"
            );
            stages.push(report);
        }

        SearchOutcome {
            records: candidates.into_iter().cloned().collect(),
            stages,
        }
    }
}

/// Filters `records` by `spec` using the built-in alias tables.
///
/// The result keeps input order. An empty filter returns every
/// record.
#[must_use]
pub fn search(records: &[TenderRecord], spec: &FilterSpec) -> Vec<TenderRecord> {
    Pipeline::new(spec, &AliasTables::default()).apply(records)
}

impl Filter {
    const fn stage(&self) -> Stage {
        match self {
            Self::Keyword(_) => Stage::Keyword,
            Self::Category(_) => Stage::Category,
            Self::CableType(_) => Stage::CableType,
            Self::Voltage(_) => Stage::Voltage,
            Self::City(_) => Stage::City,
            Self::DueDate(_) => Stage::DueDate,
        }
    }

    fn matches(&self, record: &TenderRecord) -> bool {
        match self {
            Self::Keyword(tokens) => {
                let haystack = keyword_haystack(record);
                tokens.iter().all(|token| token.is_found_in(&haystack))
            }
            Self::Category(aliases) => contains_any(&record.category_label().to_lowercase(), aliases),
            Self::CableType(aliases) => matches_cable_type(record, aliases),
            Self::Voltage(grade) => matches_voltage(record, grade),
            Self::City(city) => record.city().to_lowercase().contains(city.as_str()),
            Self::DueDate(bound) => match (bound, record.due_date) {
                (Some(bound), Some(due)) => due <= *bound,
                _ => false,
            },
        }
    }
}

fn needles(aliases: &AliasTables, kind: AliasKind, code: &str) -> Vec<String> {
    aliases
        .resolve(kind, code)
        .into_iter()
        .map(|alias| alias.to_lowercase())
        .filter(|alias| !alias.is_empty())
        .collect()
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| text.contains(needle.as_str()))
}

fn text(field: Option<&String>) -> &str {
    field.map_or("", String::as_str)
}

/// Lowercase text searched by the keyword stage.
fn keyword_haystack(record: &TenderRecord) -> String {
    let primary = [
        &record.title,
        &record.material,
        &record.organisation,
        &record.cable_type,
        &record.city,
        &record.search_index,
        &record.combined_title,
    ]
    .map(|field| text(field.as_ref()));

    let items = record
        .cable_requirements
        .iter()
        .flat_map(|item| item.fields());

    primary
        .into_iter()
        .chain(items)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `title` and `material`, lowercased, as consulted by the cable type
/// fallback and the voltage stage.
fn title_and_material(record: &TenderRecord) -> String {
    format!(
        "{} {}",
        text(record.title.as_ref()),
        text(record.material.as_ref())
    )
    .to_lowercase()
}

fn matches_cable_type(record: &TenderRecord, aliases: &[String]) -> bool {
    let primary = text(record.cable_type.as_ref()).to_lowercase();
    if contains_any(&primary, aliases) {
        return true;
    }

    if record.cable_requirements.is_empty() {
        return contains_any(&title_and_material(record), aliases);
    }

    record.cable_requirements.iter().any(|item| {
        let cable_type = text(item.cable_type.as_ref()).to_lowercase();
        contains_any(&cable_type, aliases)
    })
}

fn matches_voltage(record: &TenderRecord, grade: &str) -> bool {
    let primary = title_and_material(record);
    if primary.contains(&format!("{grade}kv")) || primary.contains(&format!("{grade} kv")) {
        return true;
    }

    record
        .cable_requirements
        .iter()
        .any(|item| text(item.voltage.as_ref()).to_lowercase().contains(grade))
}

/// Lowercases a voltage filter and drops every `kv`, so `11kV`, `11 KV` and
/// `11` all mean grade `11`.
fn normalize_voltage(voltage: &str) -> String {
    voltage.to_lowercase().replace("kv", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn records(value: serde_json::Value) -> Vec<TenderRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn ids(records: &[TenderRecord]) -> Vec<&str> {
        records.iter().map(|r| r.tender_id.as_str()).collect()
    }

    fn scenario() -> Vec<TenderRecord> {
        records(json!([
            {
                "tender_id": "T1",
                "title": "LT Cable Supply",
                "cable_type": "LT Cable",
                "city": "Pune",
                "product_category": "Wires & Cables",
                "due_date": "2025-01-10",
                "cable_requirements": []
            },
            {
                "tender_id": "T2",
                "title": "Transformer Order",
                "cable_type": "",
                "city": "Delhi",
                "product_category": "Transformers",
                "due_date": "2025-02-01",
                "cable_requirements": [{"cable_type": "Control Cable", "voltage": "1.1kV"}]
            }
        ]))
    }

    #[test]
    fn empty_spec_returns_everything_in_order() {
        let all = scenario();
        assert_eq!(search(&all, &FilterSpec::default()), all);
    }

    #[test]
    fn blank_fields_do_not_filter() {
        let all = scenario();
        let spec = FilterSpec::default()
            .with_keyword("  ")
            .with_city("")
            .with_due_date(" ");
        assert_eq!(search(&all, &spec), all);
        assert!(Pipeline::new(&spec, &AliasTables::default()).is_empty());
    }

    #[test]
    fn empty_collection_gives_empty_result() {
        let spec = FilterSpec::default().with_keyword("cable").with_city("Pune");
        assert!(search(&[], &spec).is_empty());
    }

    #[test_case(FilterSpec::default().with_category("wires-cables"), &["T1"]; "category alias")]
    #[test_case(FilterSpec::default().with_cable_type("control-cable"), &["T2"]; "cable type from line item")]
    #[test_case(FilterSpec::default().with_keyword("transformer"), &["T2"]; "keyword in title")]
    #[test_case(FilterSpec::default().with_city("del"), &["T2"]; "city substring")]
    #[test_case(FilterSpec::default().with_due_date("2025-01-31"), &["T1"]; "due before")]
    #[test_case(FilterSpec::default().with_voltage("1.1kV"), &["T2"]; "voltage from line item")]
    fn end_to_end(spec: FilterSpec, expected: &[&str]) {
        assert_eq!(ids(&search(&scenario(), &spec)), expected);
    }

    #[test]
    fn keyword_requires_every_token() {
        let all = records(json!([
            {"tender_id": "A", "title": "Supply of cable drums"},
            {"tender_id": "B", "title": "Control panel", "material": "Armoured cable"},
            {"tender_id": "C", "title": "Cable tray", "cable_requirements": [{"cable_type": "Control Cable"}]}
        ]));

        let found = search(&all, &FilterSpec::default().with_keyword("control cable"));
        assert_eq!(ids(&found), ["B", "C"]);
    }

    #[test]
    fn keyword_folds_plurals_both_ways() {
        let all = records(json!([
            {"tender_id": "plural", "title": "Supply of cables"},
            {"tender_id": "singular", "title": "Single cable run"}
        ]));

        let singular_query = search(&all, &FilterSpec::default().with_keyword("cable"));
        assert_eq!(ids(&singular_query), ["plural", "singular"]);

        let plural_query = search(&all, &FilterSpec::default().with_keyword("Cables"));
        assert_eq!(ids(&plural_query), ["plural", "singular"]);
    }

    #[test]
    fn keyword_searches_precomputed_and_line_item_fields() {
        let all = records(json!([
            {"tender_id": "index", "search_index": "gem bid xlpe"},
            {"tender_id": "combined", "combined_title": "Annual rate contract XLPE"},
            {"tender_id": "item", "cable_requirements": [{"insulation": "XLPE", "cores": 3}]},
            {"tender_id": "none", "title": "PVC only", "product_category": "xlpe"}
        ]));

        let found = search(&all, &FilterSpec::default().with_keyword("xlpe"));
        assert_eq!(ids(&found), ["index", "combined", "item"]);
    }

    #[test]
    fn category_falls_back_to_generic_field() {
        let all = records(json!([
            {"tender_id": "generic", "category": "Wires and Cables"},
            {"tender_id": "product", "product_category": "Transformers", "category": "Wires and Cables"},
            {"tender_id": "blank", "product_category": "  ", "category": "Wires & Cables"},
            {"tender_id": "empty", "product_category": "", "category": "Transformers"}
        ]));

        let found = search(&all, &FilterSpec::default().with_category("wires-cables"));
        assert_eq!(ids(&found), ["generic", "blank"]);

        let found = search(&all, &FilterSpec::default().with_category("transformers"));
        assert_eq!(ids(&found), ["product", "empty"]);
    }

    #[test]
    fn unknown_codes_match_literally() {
        let all = records(json!([
            {"tender_id": "solar", "product_category": "Solar Panels", "cable_type": "DC Solar Cable"},
            {"tender_id": "other", "product_category": "Transformers"}
        ]));

        let by_category = search(&all, &FilterSpec::default().with_category("solar"));
        assert_eq!(ids(&by_category), ["solar"]);

        let by_cable = search(&all, &FilterSpec::default().with_cable_type("dc solar"));
        assert_eq!(ids(&by_cable), ["solar"]);
    }

    #[test]
    fn cable_type_checks_every_line_item() {
        let all = records(json!([
            {
                "tender_id": "multi",
                "cable_type": "LT Cable",
                "cable_requirements": [{"cable_type": "LT Cable"}, {"cable_type": "Control Cable"}]
            }
        ]));

        let found = search(&all, &FilterSpec::default().with_cable_type("control-cable"));
        assert_eq!(ids(&found), ["multi"]);
    }

    #[test]
    fn cable_type_title_fallback_only_without_line_items() {
        let all = records(json!([
            {"tender_id": "no-items", "title": "Control Cable for substation"},
            {
                "tender_id": "items",
                "title": "Control Cable for substation",
                "cable_requirements": [{"cable_type": "HT Cable"}]
            }
        ]));

        let found = search(&all, &FilterSpec::default().with_cable_type("control-cable"));
        assert_eq!(ids(&found), ["no-items"]);
    }

    #[test]
    fn voltage_matches_line_item_or_title() {
        let all = records(json!([
            {"tender_id": "item", "cable_requirements": [{"voltage": "11kV"}]},
            {"tender_id": "title", "title": "33kV HT Cable"},
            {"tender_id": "spaced", "material": "Cable 11 KV grade"},
            {"tender_id": "neither", "title": "11 core cable"}
        ]));

        assert_eq!(
            ids(&search(&all, &FilterSpec::default().with_voltage("11kv"))),
            ["item", "spaced"]
        );
        assert_eq!(
            ids(&search(&all, &FilterSpec::default().with_voltage("33"))),
            ["title"]
        );
    }

    #[test]
    fn spaced_voltage_filter_matches_unspaced_title() {
        let all = records(json!([
            {"tender_id": "joined", "title": "11kV cable"},
            {"tender_id": "other", "title": "33kV cable"}
        ]));

        let found = search(&all, &FilterSpec::default().with_voltage("11 kV"));
        assert_eq!(ids(&found), ["joined"]);
    }

    #[test]
    fn voltage_checks_title_even_with_line_items() {
        let all = records(json!([
            {
                "tender_id": "both",
                "title": "33kV feeder",
                "cable_requirements": [{"voltage": "1.1kV"}]
            }
        ]));

        let found = search(&all, &FilterSpec::default().with_voltage("33"));
        assert_eq!(ids(&found), ["both"]);
    }

    #[test]
    fn bare_kv_voltage_is_skipped() {
        let pipeline = Pipeline::new(
            &FilterSpec::default().with_voltage("kV"),
            &AliasTables::default(),
        );
        assert!(pipeline.is_empty());
    }

    #[test]
    fn city_is_case_insensitive_substring() {
        let all = records(json!([
            {"tender_id": "bom", "city": "Mumbai"},
            {"tender_id": "pnq", "city": "Pune"},
            {"tender_id": "none"}
        ]));

        let found = search(&all, &FilterSpec::default().with_city("  MUM "));
        assert_eq!(ids(&found), ["bom"]);
    }

    #[test]
    fn due_date_is_inclusive_end_of_day() {
        let all = records(json!([
            {"tender_id": "last-second", "due_date": "2025-01-10T23:59:59"},
            {"tender_id": "morning", "due_date": "2025-01-10T09:00:00"},
            {"tender_id": "next-day", "due_date": "2025-01-11"},
            {"tender_id": "undated"}
        ]));

        let found = search(&all, &FilterSpec::default().with_due_date("2025-01-10"));
        assert_eq!(ids(&found), ["last-second", "morning"]);
    }

    #[test]
    fn unparseable_due_date_matches_nothing() {
        let found = search(&scenario(), &FilterSpec::default().with_due_date("next week"));
        assert!(found.is_empty());
    }

    #[test]
    fn search_is_idempotent() {
        let all = scenario();
        let spec = FilterSpec::default().with_keyword("cable").with_due_date("2025-12-31");
        let once = search(&all, &spec);
        assert_eq!(search(&once, &spec), once);
    }

    #[test]
    fn search_does_not_mutate_input() {
        let all = scenario();
        let before = all.clone();
        let _ = search(&all, &FilterSpec::default().with_city("Pune"));
        assert_eq!(all, before);
    }

    #[test]
    fn run_reports_each_enabled_stage() {
        let spec = FilterSpec::default()
            .with_due_date("2025-12-31")
            .with_keyword("cable")
            .with_city("pune");
        let outcome = Pipeline::new(&spec, &AliasTables::default()).run(&scenario());

        assert_eq!(ids(&outcome.records), ["T1"]);
        assert_eq!(
            outcome.stages,
            [
                StageReport { stage: Stage::Keyword, before: 2, after: 2 },
                StageReport { stage: Stage::City, before: 2, after: 1 },
                StageReport { stage: Stage::DueDate, before: 1, after: 1 },
            ]
        );
    }

    #[test]
    fn matches_agrees_with_apply() {
        let all = scenario();
        let pipeline = Pipeline::new(
            &FilterSpec::default().with_cable_type("lt-cable"),
            &AliasTables::default(),
        );
        let matched: Vec<_> = all.iter().filter(|r| pipeline.matches(r)).cloned().collect();
        assert_eq!(pipeline.apply(&all), matched);
    }

    #[test_case("11kV", "11"; "suffix")]
    #[test_case(" 11 KV ", "11"; "spaced upper")]
    #[test_case("1.1kv", "1.1"; "decimal")]
    #[test_case("kv", ""; "bare unit")]
    #[test_case("11 kV", "11"; "space before unit")]
    fn voltage_normalization(input: &str, expected: &str) {
        assert_eq!(normalize_voltage(input), expected);
    }
}
