//! The per-query filter criteria.
//!
//! A [`FilterSpec`] arrives from a form, a JSON file or command-line flags;
//! blank fields are treated the same as absent ones.

use serde::{Deserialize, Serialize};

/// The filters for one search.
///
/// Every field is optional. A field that is absent, empty or only whitespace
/// disables its filter stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Whitespace-separated words that must all occur in the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Category code, resolved through the category alias table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Cable type code, resolved through the cable-type alias table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cable_type: Option<String>,
    /// Voltage grade, with or without a `kV` suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    /// Case-insensitive substring of the city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Latest acceptable due date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl FilterSpec {
    /// Sets the keyword filter.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Sets the category filter.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the cable type filter.
    #[must_use]
    pub fn with_cable_type(mut self, cable_type: impl Into<String>) -> Self {
        self.cable_type = Some(cable_type.into());
        self
    }

    /// Sets the voltage filter.
    #[must_use]
    pub fn with_voltage(mut self, voltage: impl Into<String>) -> Self {
        self.voltage = Some(voltage.into());
        self
    }

    /// Sets the city filter.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the due date filter.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Whether no filter is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.keyword,
            &self.category,
            &self.cable_type,
            &self.voltage,
            &self.city,
            &self.due_date,
        ]
        .into_iter()
        .all(|field| active(field.as_deref()).is_none())
    }

    /// Fills every unset field from `other`.
    ///
    /// Fields already set on `self` win.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            keyword: self.keyword.or(other.keyword),
            category: self.category.or(other.category),
            cable_type: self.cable_type.or(other.cable_type),
            voltage: self.voltage.or(other.voltage),
            city: self.city.or(other.city),
            due_date: self.due_date.or(other.due_date),
        }
    }
}

/// The trimmed value of a filter field, or `None` if the field is disabled.
pub(crate) fn active(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}
