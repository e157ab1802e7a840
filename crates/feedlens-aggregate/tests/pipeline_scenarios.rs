//! End-to-end aggregation scenarios with a deterministic fake analyzer.

use std::sync::{Arc, Mutex};

use feedlens_aggregate::{
    Aggregator, Dimension, FilterSelection, GroupingMode, QuestionCatalog, QuestionCategory,
    ReportPipeline, ResultValue, NO_DATA_MESSAGE,
};
use feedlens_analyze::{LocalAnalyzer, TextAnalyzer};
use feedlens_core::{Error, Result};
use feedlens_records::{parse_json, CellValue, Record, RecordSet};

/// Records every call; fails when the input contains `fail_on`.
#[derive(Default)]
struct FakeAnalyzer {
    calls: Mutex<Vec<(&'static str, String)>>,
    fail_on: Option<&'static str>,
}

impl FakeAnalyzer {
    fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Default::default()
        }
    }

    fn respond(&self, kind: &'static str, text: &str) -> Result<String> {
        self.calls.lock().unwrap().push((kind, text.to_string()));
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        if let Some(marker) = self.fail_on {
            if text.contains(marker) {
                return Err(Error::Http("rate limited".into()));
            }
        }
        Ok(format!("{}[{}]", kind, text))
    }
}

impl TextAnalyzer for FakeAnalyzer {
    fn summarize(&self, text: &str) -> Result<String> {
        self.respond("summary", text)
    }

    fn extract_themes(&self, text: &str) -> Result<String> {
        self.respond("themes", text)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn catalog() -> QuestionCatalog {
    QuestionCatalog::from_lists(
        ["Question 1- Net Promoter", "Question 2- Satisfaction"],
        ["Question 4- Liked"],
        ["Question 4- Liked", "Question 6- Comments"],
    )
    .unwrap()
}

fn records() -> RecordSet {
    parse_json(
        r#"[
        {"Events": "Kickoff", "Event Type": "Workshop", "Program Year": 2023,
         "Question 1- Net Promoter": "9-Great", "Question 2- Satisfaction": "4",
         "Question 4- Liked": "the speakers", "Question 6- Comments": "more coffee"},
        {"Events": "Office Hours", "Event Type": "Webinar", "Program Year": 2023,
         "Question 1- Net Promoter": "7", "Question 2- Satisfaction": null,
         "Question 4- Liked": null, "Question 6- Comments": null},
        {"Events": "Demo Day", "Event Type": "Workshop", "Program Year": 2024,
         "Question 1- Net Promoter": "10 - Excellent", "Question 2- Satisfaction": "5",
         "Question 4- Liked": "demos", "Question 6- Comments": "loud room"},
        {"Events": "Kickoff", "Event Type": "Workshop", "Program Year": 2023,
         "Question 1- Net Promoter": "😀", "Question 2- Satisfaction": "3 - ok",
         "Question 4- Liked": "networking", "Question 6- Comments": null}
    ]"#,
    )
    .unwrap()
}

fn pipeline(analyzer: Arc<dyn TextAnalyzer>, catalog: &QuestionCatalog) -> ReportPipeline<'_> {
    ReportPipeline::new(catalog, analyzer)
}

#[test]
fn test_net_promoter_scenario() {
    let set = parse_json(
        r#"[{"Events":"A","Question 1- Net Promoter":"9-Great"},
            {"Events":"A","Question 1- Net Promoter":"7"}]"#,
    )
    .unwrap();
    let catalog = QuestionCatalog::from_lists(
        ["Question 1- Net Promoter"],
        Vec::<&str>::new(),
        Vec::<&str>::new(),
    )
    .unwrap();

    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &FilterSelection::default());
    assert_eq!(report.rows.len(), 1);
    assert_eq!(
        serde_json::to_value(&report.rows[0]).unwrap(),
        serde_json::json!({"Event": "A", "Question": "Question 1- Net Promoter_Average", "Value": 8.0})
    );
}

#[test]
fn test_row_order_and_suffixes() {
    let catalog = catalog();
    let set = records();
    let report = pipeline(Arc::new(FakeAnalyzer::default()), &catalog).run(&set, &FilterSelection::default());

    assert_eq!(report.mode, GroupingMode::Event);
    let events: Vec<&str> = report
        .groups
        .iter()
        .map(|k| k.value(Dimension::Event).unwrap())
        .collect();
    assert_eq!(events, vec!["Kickoff", "Office Hours", "Demo Day"]);

    let kickoff: Vec<String> = report
        .rows
        .iter()
        .filter(|r| r.key.value(Dimension::Event) == Some("Kickoff"))
        .map(|r| r.question())
        .collect();
    assert_eq!(
        kickoff,
        vec![
            "Question 1- Net Promoter_Average",
            "Question 2- Satisfaction_Average",
            "Question 4- Liked_Summary",
            "Question 4- Liked_Themes",
            "Question 6- Comments_Themes",
        ]
    );
    assert_eq!(report.rows.len(), 15);
}

#[test]
fn test_averages_skip_unparseable() {
    let catalog = catalog();
    let set = records();
    let report = pipeline(Arc::new(FakeAnalyzer::default()), &catalog).run(&set, &FilterSelection::default());

    let kickoff_nps = &report.rows[0];
    // "😀" has no leading digit and is excluded.
    assert_eq!(kickoff_nps.value, ResultValue::Number(9.0));
    let kickoff_sat = &report.rows[1];
    assert_eq!(kickoff_sat.value, ResultValue::Number(3.5));

    let office_sat = report
        .rows
        .iter()
        .find(|r| {
            r.key.value(Dimension::Event) == Some("Office Hours")
                && r.category == QuestionCategory::Numeric
                && r.column == "Question 2- Satisfaction"
        })
        .unwrap();
    assert!(office_sat.value.is_empty());
}

#[test]
fn test_all_null_text_column_emits_empty_value() {
    let catalog = catalog();
    let set = records();
    let report = pipeline(Arc::new(FakeAnalyzer::default()), &catalog).run(&set, &FilterSelection::default());

    let office_text: Vec<_> = report
        .rows
        .iter()
        .filter(|r| {
            r.key.value(Dimension::Event) == Some("Office Hours")
                && r.category != QuestionCategory::Numeric
        })
        .collect();
    assert_eq!(office_text.len(), 3);
    assert!(office_text.iter().all(|r| r.value == ResultValue::Text(String::new())));
}

#[test]
fn test_summary_and_themes_share_input() {
    let catalog = catalog();
    let set = records();
    let fake = Arc::new(FakeAnalyzer::default());
    pipeline(fake.clone(), &catalog).run(&set, &FilterSelection::default());

    let calls = fake.calls.lock().unwrap();
    let summary_inputs: Vec<&String> = calls.iter().filter(|(k, _)| *k == "summary").map(|(_, t)| t).collect();
    assert_eq!(summary_inputs[0], "the speakers networking");
    assert!(calls
        .iter()
        .any(|(k, t)| *k == "themes" && t == "the speakers networking"));
}

#[test]
fn test_analyzer_failure_is_isolated() {
    let catalog = catalog();
    let set = records();
    let fake = Arc::new(FakeAnalyzer::failing_on("demos"));
    let report = pipeline(fake, &catalog).run(&set, &FilterSelection::default());

    let demo_liked: Vec<_> = report
        .rows
        .iter()
        .filter(|r| r.key.value(Dimension::Event) == Some("Demo Day") && r.column == "Question 4- Liked")
        .collect();
    assert_eq!(demo_liked.len(), 2);
    assert!(demo_liked.iter().all(|r| r.value.is_empty()));

    let demo_comments = report
        .rows
        .iter()
        .find(|r| r.key.value(Dimension::Event) == Some("Demo Day") && r.column == "Question 6- Comments")
        .unwrap();
    assert_eq!(demo_comments.value.as_str(), Some("themes[loud room]"));
}

#[test]
fn test_year_then_type_grouping() {
    let catalog = catalog();
    let set = records();
    let selection = FilterSelection {
        program_years: vec!["2023".into(), "2024".into()],
        ..Default::default()
    };
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &selection);

    assert_eq!(report.mode, GroupingMode::YearThenType);
    let keys: Vec<String> = report.groups.iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["(2023, Workshop)", "(2023, Webinar)", "(2024, Workshop)"]);

    let first = serde_json::to_value(&report.rows[0]).unwrap();
    assert_eq!(first["Program Year"], "2023");
    assert_eq!(first["Event Type"], "Workshop");
    assert!(first.get("Event").is_none());
}

#[test]
fn test_event_type_grouping() {
    let catalog = catalog();
    let set = records();
    let selection = FilterSelection {
        event_types: vec!["Workshop".into()],
        ..Default::default()
    };
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &selection);
    assert_eq!(report.mode, GroupingMode::EventType);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].to_string(), "(Workshop)");
    assert_eq!(report.raw.len(), 3);
}

#[test]
fn test_single_event_selection() {
    let catalog = catalog();
    let set = records();
    let selection = FilterSelection {
        events: vec!["Kickoff".into()],
        ..Default::default()
    };
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &selection);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].to_string(), "(Kickoff)");
    assert_eq!(report.raw.len(), 2);
}

#[test]
fn test_no_data_report() {
    let catalog = catalog();
    let set = records();
    let selection = FilterSelection {
        events: vec!["Nonexistent".into()],
        ..Default::default()
    };
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &selection);
    assert!(report.is_empty());
    assert!(report.rows.is_empty());
    assert!(report.raw.is_empty());
    assert_eq!(report.message.as_deref(), Some(NO_DATA_MESSAGE));
}

#[test]
fn test_missing_catalog_column_emits_nothing() {
    let catalog = QuestionCatalog::from_lists(["Not In Schema"], ["Also Missing"], Vec::<&str>::new()).unwrap();
    let set = records();
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &FilterSelection::default());
    assert_eq!(report.groups.len(), 3);
    assert!(report.rows.is_empty());
}

#[test]
fn test_aggregate_is_idempotent_and_worker_independent() {
    let catalog = catalog();
    let set = records();
    let records: Vec<&Record> = set.records().iter().collect();
    let (_, groups) =
        feedlens_aggregate::group_records(&records, &FilterSelection::default(), catalog.dimensions());

    let analyzer: Arc<dyn TextAnalyzer> = Arc::new(LocalAnalyzer::new());
    let sequential = Aggregator::new(&catalog, analyzer.clone()).aggregate(&groups, set.columns());
    let again = Aggregator::new(&catalog, analyzer.clone()).aggregate(&groups, set.columns());
    let parallel = Aggregator::new(&catalog, analyzer)
        .with_workers(4)
        .aggregate(&groups, set.columns());

    assert_eq!(sequential, again);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_numeric_cells_and_lists() {
    let set = RecordSet::from_rows(vec![
        vec![
            ("Events", CellValue::from("A")),
            ("Rating", CellValue::from(6)),
            ("Tags", CellValue::List(vec!["food".into(), "venue".into()])),
        ],
        vec![
            ("Events", CellValue::from("A")),
            ("Rating", CellValue::from(9.9)),
            ("Tags", CellValue::List(vec!["food".into()])),
        ],
    ]);
    let catalog = QuestionCatalog::from_lists(["Rating"], Vec::<&str>::new(), ["Tags"]).unwrap();
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &FilterSelection::default());

    assert_eq!(report.rows[0].value, ResultValue::Number(7.5));
    assert_eq!(
        report.rows[1].value.as_str(),
        Some("food, (1 mentions)\nvenue (1 mentions)\nfood (1 mentions)")
    );
}

#[test]
fn test_records_without_group_value_excluded_from_raw() {
    let set = parse_json(
        r#"[{"Events": "A", "Rating": "8", "Liked": "talks"},
            {"Events": null, "Rating": "2", "Liked": "queue"}]"#,
    )
    .unwrap();
    let catalog = QuestionCatalog::from_lists(["Rating"], ["Liked"], Vec::<&str>::new()).unwrap();
    let report = pipeline(Arc::new(FakeAnalyzer::default()), &catalog).run(&set, &FilterSelection::default());

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.raw.len(), 1);
    assert_eq!(report.raw[0].get("Events"), Some(&CellValue::from("A")));
    assert_eq!(report.rows[0].value, ResultValue::Number(8.0));
    assert_eq!(report.rows[1].value.as_str(), Some("summary[talks]"));
}

#[test]
fn test_half_cent_mean_rounds_to_even() {
    let rows: Vec<Vec<(&str, CellValue)>> = ["1", "1", "1", "1", "1", "1", "1", "2"]
        .iter()
        .map(|v| vec![("Events", CellValue::from("A")), ("Rating", CellValue::from(*v))])
        .collect();
    let set = RecordSet::from_rows(rows);
    let catalog = QuestionCatalog::from_lists(["Rating"], Vec::<&str>::new(), Vec::<&str>::new()).unwrap();
    let report = pipeline(Arc::new(LocalAnalyzer::new()), &catalog).run(&set, &FilterSelection::default());

    assert_eq!(report.rows[0].value, ResultValue::Number(1.12));
}
