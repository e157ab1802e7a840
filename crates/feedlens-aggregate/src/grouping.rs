//! Grouping engine: partitions filtered records by the active dimension(s).
//!
//! Precedence:
//! 1. more than one program year selected → program year, then event type
//! 2. event types selected and no events selected → event type
//! 3. otherwise → event
//!
//! Group values appear in first-occurrence order of the filtered records.

use std::collections::HashMap;

use feedlens_records::Record;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::catalog::DimensionColumns;
use crate::selection::{Dimension, FilterSelection};

/// Which dimension(s) the records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    YearThenType,
    EventType,
    Event,
}

impl GroupingMode {
    pub fn for_selection(selection: &FilterSelection) -> Self {
        if selection.program_years.len() > 1 {
            GroupingMode::YearThenType
        } else if selection.is_active(Dimension::EventType) && !selection.is_active(Dimension::Event) {
            GroupingMode::EventType
        } else {
            GroupingMode::Event
        }
    }

    /// Grouping dimensions, outermost first.
    pub fn dimensions(&self) -> &'static [Dimension] {
        match self {
            GroupingMode::YearThenType => &[Dimension::ProgramYear, Dimension::EventType],
            GroupingMode::EventType => &[Dimension::EventType],
            GroupingMode::Event => &[Dimension::Event],
        }
    }

    /// Whether `record` has a value for every grouping dimension.
    pub fn covers(&self, record: &Record, columns: &DimensionColumns) -> bool {
        self.dimensions()
            .iter()
            .all(|d| record.text(d.column(columns)).is_some())
    }
}

/// (dimension, value) pairs identifying a group, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GroupKey(Vec<(Dimension, String)>);

impl GroupKey {
    pub fn new(parts: Vec<(Dimension, String)>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[(Dimension, String)] {
        &self.0
    }

    pub fn value(&self, dimension: Dimension) -> Option<&str> {
        self.0
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, dimension: Dimension, value: String) -> Self {
        let mut parts = self.0.clone();
        parts.push((dimension, value));
        Self(parts)
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<&str> = self.0.iter().map(|(_, v)| v.as_str()).collect();
        write!(f, "({})", values.join(", "))
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (dimension, value) in &self.0 {
            map.serialize_entry(dimension.label(), value)?;
        }
        map.end()
    }
}

/// One partition of the filtered records.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub key: GroupKey,
    pub records: Vec<&'a Record>,
}

/// Partition `records` according to the selection's grouping mode.
///
/// Records with no value for a grouping dimension belong to no group.
pub fn group_records<'a>(
    records: &[&'a Record],
    selection: &FilterSelection,
    columns: &DimensionColumns,
) -> (GroupingMode, Vec<Group<'a>>) {
    let mode = GroupingMode::for_selection(selection);
    let mut groups = Vec::new();
    partition(records.to_vec(), mode.dimensions(), columns, GroupKey::default(), &mut groups);

    let grouped: usize = groups.iter().map(|g| g.records.len()).sum();
    if grouped < records.len() {
        debug!(
            "{} records lack a grouping value and were left out",
            records.len() - grouped
        );
    }
    debug!("Grouping mode {:?}: {} groups", mode, groups.len());

    (mode, groups)
}

fn partition<'a>(
    records: Vec<&'a Record>,
    dimensions: &[Dimension],
    columns: &DimensionColumns,
    prefix: GroupKey,
    out: &mut Vec<Group<'a>>,
) {
    let Some((&dimension, rest)) = dimensions.split_first() else {
        if !records.is_empty() {
            out.push(Group {
                key: prefix,
                records,
            });
        }
        return;
    };

    let column = dimension.column(columns);
    let mut order: Vec<(String, Vec<&'a Record>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(value) = record.text(column) else {
            continue;
        };
        match index.get(&value) {
            Some(&i) => order[i].1.push(record),
            None => {
                index.insert(value.clone(), order.len());
                order.push((value, vec![record]));
            }
        }
    }

    for (value, members) in order {
        partition(members, rest, columns, prefix.child(dimension, value), out);
    }
}
