use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{TenderId, due_date};

/// One procurement opportunity.
///
/// The primary fields (`cable_type`, `material`, `title`) describe the first
/// or dominant requirement of the tender. Further requirements may be listed
/// in [`cable_requirements`](Self::cable_requirements) without being
/// reflected in the primary fields, so searches consider both.
///
/// Every field except `tender_id` is optional. Deserialization is lenient:
/// numbers in text fields become text, unusable due dates become `None`, and
/// a `cable_requirements` value that is not an array means no line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRecord {
    /// Unique identifier, stable across loads.
    pub tender_id: TenderId,

    /// Headline of the tender.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Issuing organisation.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,

    /// Material of the dominant requirement.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    /// Delivery or site city.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Cable type of the dominant requirement.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub cable_type: Option<String>,

    /// Free-text product category label.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,

    /// Generic category label, consulted when `product_category` is absent.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Submission deadline.
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        serialize_with = "due_date::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDateTime>,

    /// Line-item requirements, in the order they were listed.
    #[serde(default, deserialize_with = "lenient::line_items", skip_serializing_if = "Vec::is_empty")]
    pub cable_requirements: Vec<LineItem>,

    /// Precomputed free text, used by keyword search only.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub search_index: Option<String>,

    /// Precomputed combined title, used by keyword search only.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub combined_title: Option<String>,
}

/// A single material requirement attached to a tender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Cable type, e.g. `Control Cable`.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub cable_type: Option<String>,

    /// Voltage grade, e.g. `1.1kV`.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,

    /// Conductor material.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub conductor: Option<String>,

    /// Cross-section size.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Number of cores.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub cores: Option<String>,

    /// Insulation material.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub insulation: Option<String>,
}

impl TenderRecord {
    /// The category label used for category filtering.
    ///
    /// `product_category` wins; the generic `category` is used when the
    /// former is absent or blank.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.product_category
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .or(self.category.as_deref())
            .unwrap_or_default()
    }

    /// The title, or an empty string.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// The city, or an empty string.
    #[must_use]
    pub fn city(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }
}

impl LineItem {
    /// All text fields in declaration order, absent ones as empty strings.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.cable_type,
            &self.voltage,
            &self.conductor,
            &self.size,
            &self.cores,
            &self.insulation,
        ]
        .map(|field| field.as_deref().unwrap_or_default())
    }
}

mod lenient {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, de::IgnoredAny};

    use super::LineItem;
    use crate::domain::due_date;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
        Other(IgnoredAny),
    }

    impl Scalar {
        fn into_text(self) -> Option<String> {
            match self {
                Self::Text(text) => Some(text),
                Self::Integer(n) => Some(n.to_string()),
                Self::Float(n) => Some(n.to_string()),
                Self::Bool(b) => Some(b.to_string()),
                Self::Other(_) => None,
            }
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_text))
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = text(deserializer)?;
        let parsed = raw.as_deref().and_then(due_date::parse_timestamp);
        if parsed.is_none() {
            if let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) {
                tracing::debug!(value = %raw, "ignoring unparseable due_date");
            }
        }
        Ok(parsed)
    }

    pub fn line_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<LineItem>, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let serde_json::Value::Array(entries) = value else {
            return Ok(Vec::new());
        };

        Ok(entries
            .into_iter()
            .filter(serde_json::Value::is_object)
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }
}
