//! Command-line subcommands: one-off reports and catalog checks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use feedlens_aggregate::{FilterSelection, QuestionCatalog, ReportPipeline};
use feedlens_analyze::{create_analyzer, AnalyzerConfig};
use feedlens_core::FeedlensConfig;
use feedlens_records::load_records;

/// Parsed arguments of `feedlens report`.
#[derive(Debug, Default, PartialEq)]
pub struct ReportArgs {
    pub selection: FilterSelection,
    pub records: Option<PathBuf>,
}

/// Parse `[--event X]... [--type T]... [--year Y]... [records-file]`.
pub fn parse_report_args(args: &[String]) -> Result<ReportArgs, String> {
    let mut parsed = ReportArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let target = match arg.as_str() {
            "--event" | "-e" => &mut parsed.selection.events,
            "--type" | "-t" => &mut parsed.selection.event_types,
            "--year" | "-y" => &mut parsed.selection.program_years,
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {}", flag)),
            path => {
                if parsed.records.is_some() {
                    return Err(format!("Unexpected argument: {}", path));
                }
                parsed.records = Some(PathBuf::from(path));
                continue;
            }
        };
        match iter.next() {
            Some(value) => target.push(value.clone()),
            None => return Err(format!("Missing value for {}", arg)),
        }
    }

    Ok(parsed)
}

/// `feedlens report`: build one report and print its result table as JSON.
pub fn run_report(data_dir: &Path, args: &[String]) -> anyhow::Result<()> {
    let args = parse_report_args(args).map_err(|e| anyhow::anyhow!(e))?;
    let config = FeedlensConfig::from_env(data_dir)?;

    let catalog = QuestionCatalog::load(&config.data_paths.catalog_file)?;
    let records_path = args
        .records
        .unwrap_or_else(|| config.data_paths.records_file.clone());
    let set = load_records(&records_path)?;
    catalog.missing_columns(&set);

    let analyzer_config = AnalyzerConfig::load(&config.data_paths.llm_config_file);
    let analyzer = create_analyzer(
        &analyzer_config,
        Duration::from_secs(config.analyzer_timeout_secs),
    );

    let report = ReportPipeline::new(&catalog, analyzer)
        .with_workers(config.analyzer_workers)
        .run(&set, &args.selection);

    if let Some(message) = &report.message {
        eprintln!("{}", message);
    }
    println!("{}", serde_json::to_string_pretty(&report.rows)?);
    Ok(())
}

/// Outcome of `feedlens check-catalog`.
#[derive(Debug)]
pub struct CatalogCheck {
    pub catalog_path: PathBuf,
    pub valid: bool,
    pub numeric: usize,
    pub summary: usize,
    pub themes: usize,
    pub records: Option<usize>,
    pub missing_columns: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Validate a catalog file and compare it against the record schema.
pub fn check_catalog(catalog_path: &Path, records_path: &Path) -> CatalogCheck {
    let mut check = CatalogCheck {
        catalog_path: catalog_path.to_path_buf(),
        valid: false,
        numeric: 0,
        summary: 0,
        themes: 0,
        records: None,
        missing_columns: Vec::new(),
        warnings: Vec::new(),
        errors: Vec::new(),
    };

    if !catalog_path.exists() {
        check
            .warnings
            .push(format!("{} not found, checking built-in catalog", catalog_path.display()));
    }

    let catalog = match QuestionCatalog::load(catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            check.errors.push(format!("Catalog rejected: {}", e));
            return check;
        }
    };
    check.valid = true;
    check.numeric = catalog.columns_for(feedlens_aggregate::QuestionCategory::Numeric).len();
    check.summary = catalog.columns_for(feedlens_aggregate::QuestionCategory::Summary).len();
    check.themes = catalog.columns_for(feedlens_aggregate::QuestionCategory::Theme).len();

    match load_records(records_path) {
        Ok(set) => {
            check.records = Some(set.len());
            check.missing_columns = catalog
                .missing_columns(&set)
                .into_iter()
                .map(String::from)
                .collect();
        }
        Err(e) => check
            .warnings
            .push(format!("Record schema not checked: {}", e)),
    }

    check
}

pub fn print_catalog_check(check: &CatalogCheck) {
    println!("=== Feedlens Catalog Check ===");
    println!();
    println!("Catalog:            {}", check.catalog_path.display());
    println!("Catalog valid:      {}", if check.valid { "YES" } else { "NO" });
    println!("Numeric questions:  {}", check.numeric);
    println!("Summary questions:  {}", check.summary);
    println!("Theme questions:    {}", check.themes);
    match check.records {
        Some(n) => println!("Records:            {}", n),
        None => println!("Records:            not loaded"),
    }

    if !check.missing_columns.is_empty() {
        println!();
        println!("Missing from record schema:");
        for column in &check.missing_columns {
            println!("  - {}", column);
        }
    }

    if !check.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &check.warnings {
            println!("  - {}", w);
        }
    }

    if !check.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &check.errors {
            println!("  - {}", e);
        }
    }

    println!();
    if check.valid && check.missing_columns.is_empty() {
        println!("Status: READY");
    } else if check.valid {
        println!("Status: READY (missing columns yield empty values)");
    } else {
        println!("Status: INVALID");
    }
}
