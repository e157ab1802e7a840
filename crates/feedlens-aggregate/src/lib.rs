//! Feedback aggregation pipeline.
//!
//! Filters the record set by the active selection, partitions it into
//! groups (event, event type, or program year → event type), then reduces
//! every cataloged question per group to an average, a summary, or a theme
//! list. The analyzer backend is injected; nothing here holds global state.

pub mod aggregator;
pub mod catalog;
pub mod extract;
pub mod grouping;
pub mod raw;
pub mod report;
pub mod selection;

pub use aggregator::{Aggregator, ResultRow, ResultValue};
pub use catalog::{DimensionColumns, QuestionCatalog, QuestionCategory};
pub use extract::{extract_leading_number, leading_number};
pub use grouping::{group_records, Group, GroupKey, GroupingMode};
pub use raw::{project_raw_feedback, RawFeedbackRow};
pub use report::{FeedbackReport, ReportPipeline, NO_DATA_MESSAGE};
pub use selection::{filter_options, Dimension, FilterOptions, FilterSelection, ALL_EVENTS};
