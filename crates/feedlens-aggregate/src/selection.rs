//! Filter selection and the option lists offered to selection widgets.

use std::collections::BTreeSet;

use feedlens_records::{Record, RecordSet};
use serde::{Deserialize, Serialize};

use crate::catalog::DimensionColumns;

/// Sentinel event option meaning "no event filter".
pub const ALL_EVENTS: &str = "All Events";

/// Filter and grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Event,
    EventType,
    ProgramYear,
}

impl Dimension {
    /// Field name used for this dimension in result rows.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Event => "Event",
            Dimension::EventType => "Event Type",
            Dimension::ProgramYear => "Program Year",
        }
    }

    /// Source column for this dimension.
    pub fn column<'a>(&self, columns: &'a DimensionColumns) -> &'a str {
        match self {
            Dimension::Event => &columns.event,
            Dimension::EventType => &columns.event_type,
            Dimension::ProgramYear => &columns.program_year,
        }
    }
}

/// Values chosen per dimension. An empty list leaves the dimension inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default, rename = "eventTypes")]
    pub event_types: Vec<String>,
    #[serde(default, rename = "programYears")]
    pub program_years: Vec<String>,
}

impl FilterSelection {
    pub fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Event => &self.events,
            Dimension::EventType => &self.event_types,
            Dimension::ProgramYear => &self.program_years,
        }
    }

    /// Whether `dimension` filters records. Events selected together with
    /// the "All Events" option count as inactive.
    pub fn is_active(&self, dimension: Dimension) -> bool {
        let values = self.values(dimension);
        match dimension {
            Dimension::Event => !values.is_empty() && !values.iter().any(|v| v == ALL_EVENTS),
            _ => !values.is_empty(),
        }
    }

    /// Records matching every active dimension, in source order.
    pub fn apply<'a>(&self, set: &'a RecordSet, columns: &DimensionColumns) -> Vec<&'a Record> {
        let active: Vec<(&str, &[String])> = [Dimension::Event, Dimension::EventType, Dimension::ProgramYear]
            .into_iter()
            .filter(|d| self.is_active(*d))
            .map(|d| (d.column(columns), self.values(d)))
            .collect();

        set.records()
            .iter()
            .filter(|record| {
                active.iter().all(|(column, allowed)| {
                    record
                        .text(column)
                        .map(|v| allowed.iter().any(|a| *a == v))
                        .unwrap_or(false)
                })
            })
            .collect()
    }
}

/// Sorted distinct values per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub events: Vec<String>,
    #[serde(rename = "eventTypes")]
    pub event_types: Vec<String>,
    #[serde(rename = "programYears")]
    pub program_years: Vec<String>,
}

/// Option lists for the selection widgets.
pub fn filter_options(set: &RecordSet, columns: &DimensionColumns) -> FilterOptions {
    let distinct = |column: &str| -> Vec<String> {
        set.records()
            .iter()
            .filter_map(|r| r.text(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    FilterOptions {
        events: distinct(&columns.event),
        event_types: distinct(&columns.event_type),
        program_years: distinct(&columns.program_year),
    }
}
