//! Question catalog: which columns are averaged, summarized, or themed.
//!
//! Declaration order within each category defines output row order.

use std::collections::HashSet;
use std::path::Path;

use feedlens_core::{Error, Result};
use feedlens_records::RecordSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How a question column is reduced per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Numeric,
    Summary,
    Theme,
}

impl QuestionCategory {
    /// Emission order inside a group.
    pub fn all() -> &'static [QuestionCategory] {
        &[Self::Numeric, Self::Summary, Self::Theme]
    }

    /// Suffix appended to the column name in result rows.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Numeric => "_Average",
            Self::Summary => "_Summary",
            Self::Theme => "_Themes",
        }
    }
}

/// Source column names of the three filter/grouping dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionColumns {
    #[serde(default = "default_event_column")]
    pub event: String,
    #[serde(default = "default_event_type_column")]
    pub event_type: String,
    #[serde(default = "default_program_year_column")]
    pub program_year: String,
}

fn default_event_column() -> String {
    "Events".into()
}
fn default_event_type_column() -> String {
    "Event Type".into()
}
fn default_program_year_column() -> String {
    "Program Year".into()
}

impl Default for DimensionColumns {
    fn default() -> Self {
        Self {
            event: default_event_column(),
            event_type: default_event_type_column(),
            program_year: default_program_year_column(),
        }
    }
}

/// On-disk catalog layout (catalog.json).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    dimensions: DimensionColumns,
    #[serde(default)]
    numeric: Vec<String>,
    #[serde(default)]
    summary: Vec<String>,
    #[serde(default)]
    themes: Vec<String>,
}

/// Validated column → category mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile")]
pub struct QuestionCatalog {
    dimensions: DimensionColumns,
    numeric: Vec<String>,
    summary: Vec<String>,
    themes: Vec<String>,
}

impl TryFrom<CatalogFile> for QuestionCatalog {
    type Error = Error;

    fn try_from(file: CatalogFile) -> Result<Self> {
        Self::new(file.dimensions, file.numeric, file.summary, file.themes)
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        let numeric = [
            "Question 1- Net Promoter",
            "Question 2- Overall Satisfaction",
            "Question 3- Content Relevance",
        ];
        let summary = [
            "Question 4- What did you like most?",
            "Question 5- What could be improved?",
        ];
        let themes = [
            "Question 4- What did you like most?",
            "Question 5- What could be improved?",
            "Question 6- Additional Comments",
        ];
        Self {
            dimensions: DimensionColumns::default(),
            numeric: numeric.iter().map(|s| s.to_string()).collect(),
            summary: summary.iter().map(|s| s.to_string()).collect(),
            themes: themes.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl QuestionCatalog {
    /// Build and validate a catalog.
    pub fn new(
        dimensions: DimensionColumns,
        numeric: Vec<String>,
        summary: Vec<String>,
        themes: Vec<String>,
    ) -> Result<Self> {
        let catalog = Self {
            dimensions,
            numeric,
            summary,
            themes,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog with default dimension columns.
    pub fn from_lists<S: Into<String>>(
        numeric: impl IntoIterator<Item = S>,
        summary: impl IntoIterator<Item = S>,
        themes: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        Self::new(
            DimensionColumns::default(),
            numeric.into_iter().map(Into::into).collect(),
            summary.into_iter().map(Into::into).collect(),
            themes.into_iter().map(Into::into).collect(),
        )
    }

    /// Load a catalog file; a missing file yields the built-in default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No catalog at {}, using built-in catalog", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&text)?;
        let catalog = Self::try_from(file)?;
        info!(
            "Loaded catalog from {} ({} numeric, {} summary, {} themes)",
            path.display(),
            catalog.numeric.len(),
            catalog.summary.len(),
            catalog.themes.len()
        );
        Ok(catalog)
    }

    /// Reject catalogs that mix Numeric with Summary/Theme, repeat a column
    /// within a category, or reuse a dimension column as a question.
    pub fn validate(&self) -> Result<()> {
        for category in QuestionCategory::all() {
            let mut seen = HashSet::new();
            for column in self.columns_for(*category) {
                if column.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "empty column name in {:?} questions",
                        category
                    )));
                }
                if !seen.insert(column.as_str()) {
                    return Err(Error::Config(format!(
                        "column '{}' declared twice as {:?}",
                        column, category
                    )));
                }
            }
        }

        let text: HashSet<&str> = self
            .summary
            .iter()
            .chain(self.themes.iter())
            .map(String::as_str)
            .collect();
        if let Some(column) = self.numeric.iter().find(|c| text.contains(c.as_str())) {
            return Err(Error::Config(format!(
                "column '{}' cannot be both numeric and free-text",
                column
            )));
        }

        let dims = [
            &self.dimensions.event,
            &self.dimensions.event_type,
            &self.dimensions.program_year,
        ];
        if let Some(column) = self
            .numeric
            .iter()
            .chain(self.summary.iter())
            .chain(self.themes.iter())
            .find(|c| dims.contains(c))
        {
            return Err(Error::Config(format!(
                "dimension column '{}' cannot also be a question",
                column
            )));
        }

        Ok(())
    }

    pub fn dimensions(&self) -> &DimensionColumns {
        &self.dimensions
    }

    /// Columns of one category in declaration order.
    pub fn columns_for(&self, category: QuestionCategory) -> &[String] {
        match category {
            QuestionCategory::Numeric => &self.numeric,
            QuestionCategory::Summary => &self.summary,
            QuestionCategory::Theme => &self.themes,
        }
    }

    /// Free-text columns (summary, then theme-only), deduplicated.
    pub fn text_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.summary
            .iter()
            .chain(self.themes.iter())
            .map(String::as_str)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Cataloged columns absent from the record schema.
    pub fn missing_columns(&self, set: &RecordSet) -> Vec<&str> {
        let mut seen = HashSet::new();
        let missing: Vec<&str> = self
            .numeric
            .iter()
            .chain(self.summary.iter())
            .chain(self.themes.iter())
            .map(String::as_str)
            .filter(|c| seen.insert(*c))
            .filter(|c| !set.has_column(c))
            .collect();
        if !missing.is_empty() {
            warn!("Catalog columns missing from record schema: {:?}", missing);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let catalog = QuestionCatalog::default();
        assert!(catalog.validate().is_ok());
        assert_eq!(
            catalog.columns_for(QuestionCategory::Numeric)[0],
            "Question 1- Net Promoter"
        );
    }

    #[test]
    fn test_summary_and_theme_allowed() {
        let catalog = QuestionCatalog::from_lists(["Rating"], ["Liked"], ["Liked", "Other"]).unwrap();
        assert_eq!(catalog.columns_for(QuestionCategory::Summary), &["Liked"]);
        assert_eq!(catalog.columns_for(QuestionCategory::Theme), &["Liked", "Other"]);
        assert_eq!(catalog.text_columns(), vec!["Liked", "Other"]);
    }

    #[test]
    fn test_numeric_and_text_rejected() {
        let err = QuestionCatalog::from_lists(["Liked"], ["Liked"], Vec::<&str>::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = QuestionCatalog::from_lists(["Other"], Vec::<&str>::new(), ["Other"]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(QuestionCatalog::from_lists(["A", "A"], Vec::<&str>::new(), Vec::<&str>::new()).is_err());
    }

    #[test]
    fn test_dimension_as_question_rejected() {
        assert!(QuestionCatalog::from_lists(["Events"], Vec::<&str>::new(), Vec::<&str>::new()).is_err());
    }

    #[test]
    fn test_columns_order_stable() {
        let catalog = QuestionCatalog::from_lists(["B", "A", "C"], Vec::<&str>::new(), Vec::<&str>::new()).unwrap();
        let first: Vec<_> = catalog.columns_for(QuestionCategory::Numeric).to_vec();
        let second: Vec<_> = catalog.columns_for(QuestionCategory::Numeric).to_vec();
        assert_eq!(first, vec!["B", "A", "C"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_file_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = QuestionCatalog::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(missing, QuestionCatalog::default());

        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"dimensions": {"event": "Event Name"}, "numeric": ["Q1"], "summary": ["Q2"], "themes": ["Q2"]}"#,
        )
        .unwrap();
        let catalog = QuestionCatalog::load(&path).unwrap();
        assert_eq!(catalog.dimensions().event, "Event Name");
        assert_eq!(catalog.dimensions().event_type, "Event Type");
        assert_eq!(catalog.columns_for(QuestionCategory::Theme), &["Q2"]);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"numeric": ["Q1"], "summary": ["Q1"]}"#).unwrap();
        assert!(QuestionCatalog::load(&path).is_err());
    }

    #[test]
    fn test_missing_columns() {
        let catalog = QuestionCatalog::from_lists(["Q1"], ["Q2"], ["Q2", "Q3"]).unwrap();
        let set = RecordSet::from_rows(vec![vec![("Events", "A"), ("Q2", "fine")]]);
        assert_eq!(catalog.missing_columns(&set), vec!["Q1", "Q3"]);
    }
}
