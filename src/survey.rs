use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_metrics::instruments;
use survey_metrics::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_json;

pub use crate::survey::config_reader::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no worksheet to read"))]
    EmptyExcel { path: String },
    #[snafu(display(
        "The spreadsheet {path} has several worksheets, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("The spreadsheet {path} has no worksheet named {worksheet}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Expected an array of records in {path}"))]
    JsonNotArray { path: String },
    #[snafu(display("Record {lineno} in {path} is not a JSON object"))]
    JsonNotObject { path: String, lineno: usize },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the header of {path}"))]
    CsvHeader { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Unknown instrument {name}, expected one of {expected}"))]
    UnknownInstrument { name: String, expected: String },
    #[snafu(display("Instrument {instrument} does not record a country"))]
    NoCountryField { instrument: String },
    #[snafu(display("Unknown provider {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Unknown validation mode {mode}"))]
    UnknownValidationMode { mode: String },
    #[snafu(display("Missing input file"))]
    MissingInput {},
    #[snafu(display("Missing parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error processing the survey data"))]
    Metrics { source: MetricsErrors },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SResult<T> = Result<T, SurveyError>;

/// A record, as parsed by the readers.
/// This is before any validation against an instrument.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRecord {
    pub id: Option<String>,
    pub fields: Vec<(String, FieldValue)>,
}

fn summary_to_json(s: &RegionSummary) -> JSValue {
    let distribution: Vec<JSValue> = s
        .distribution
        .iter()
        .map(|(label, count)| json!({"label": label, "count": count}))
        .collect();

    let mut indicators: JSMap<String, JSValue> = JSMap::new();
    for (name, pct) in s.indicators.iter() {
        indicators.insert(name.clone(), json!(pct));
    }

    let mut metrics: JSMap<String, JSValue> = JSMap::new();
    for (name, avg) in s.metrics.iter() {
        metrics.insert(name.clone(), json!(avg));
    }

    let cross_tabs: Vec<JSValue> = s
        .cross_tabs
        .iter()
        .map(|ct| {
            let buckets: Vec<JSValue> = ct
                .buckets
                .iter()
                .map(|b| json!({"label": b.label, "count": b.count, "value": b.value}))
                .collect();
            json!({"dimension": ct.dimension, "metric": ct.metric, "buckets": buckets})
        })
        .collect();

    json!({
        "region": s.region,
        "instrument": s.instrument,
        "participants": s.participants,
        "rejected": s.rejected,
        "averageUsageHours": s.average_usage_hours,
        "averageWellbeing": s.average_wellbeing,
        "distribution": distribution,
        "indicators": indicators,
        "metrics": metrics,
        "crossTabs": cross_tabs,
    })
}

fn build_summary_js(config: &DashboardConfig, summaries: &[RegionSummary]) -> JSValue {
    let c = OutputConfig {
        dashboard: config.output_settings.dashboard_name.clone(),
        date: config.output_settings.survey_date.clone(),
        organization: config.output_settings.survey_organization.clone(),
    };
    let regions: Vec<JSValue> = summaries.iter().map(summary_to_json).collect();
    json!({
        "config": c,
        "regions": regions })
}

fn to_survey_records(
    parsed: Vec<ParsedRecord>,
    default_id: impl Fn(usize) -> String,
) -> Vec<SurveyRecord> {
    parsed
        .into_iter()
        .enumerate()
        .map(|(idx, pr)| {
            let id = pr.id.unwrap_or_else(|| default_id(idx + 1));
            let mut record = SurveyRecord::new(&id);
            for (code, value) in pr.fields {
                record.insert(&code, value);
            }
            record
        })
        .collect()
}

fn read_survey_data(root_path: &Path, cfs: &FileSource) -> SResult<Vec<SurveyRecord>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read survey file {:?}", p2);
    let parsed = match cfs.provider.as_str() {
        "json" => io_json::read_json_records(&p2, cfs)?,
        "csv" => io_csv::read_csv_records(&p2, cfs)?,
        "xlsx" | "excel" => io_excel::read_excel_records(&p2, cfs)?,
        x => {
            return UnknownProviderSnafu {
                provider: x.to_string(),
            }
            .fail();
        }
    };
    debug!("read_survey_data: {:?} records in {:?}", parsed.len(), p2);
    Ok(to_survey_records(parsed, io_common::make_default_id(&p2)))
}

fn validate_rules(rules: &SurveyRules) -> SResult<ValidationPolicy> {
    match rules.validation.as_deref() {
        None | Some("flag") => Ok(ValidationPolicy::Flag),
        Some("failFast") => Ok(ValidationPolicy::FailFast),
        Some(x) => UnknownValidationModeSnafu {
            mode: x.to_string(),
        }
        .fail(),
    }
}

fn get_instrument(cfs: &FileSource) -> SResult<Instrument> {
    instruments::by_name(&cfs.instrument).context(UnknownInstrumentSnafu {
        name: cfs.instrument.clone(),
        expected: instruments::NAMES.join(", "),
    })
}

/// The name of a region: as configured, or the name of the country, or the name
/// of the instrument.
fn region_name(cfs: &FileSource, country: Option<&str>) -> String {
    match (&cfs.region, country) {
        (Some(r), _) => r.clone(),
        (None, Some(code)) => instruments::country_name(code)
            .map(|n| n.to_string())
            .unwrap_or_else(|| code.to_string()),
        (None, None) => cfs.instrument.clone(),
    }
}

/// Name of the summary holding the rejected records without a country.
const UNATTRIBUTED_REGION: &str = "Unattributed";

fn summarize_source(
    root_path: &Path,
    cfs: &FileSource,
    policy: ValidationPolicy,
) -> SResult<Vec<RegionSummary>> {
    let instrument = get_instrument(cfs)?;
    if cfs.country_code.is_some() && instrument.country_field.is_none() {
        return NoCountryFieldSnafu {
            instrument: instrument.name,
        }
        .fail();
    }
    let records = read_survey_data(root_path, cfs)?;
    let dataset = Dataset::load(records, &instrument, policy).context(MetricsSnafu {})?;

    let res = match (&cfs.country_code, cfs.split_by_country.unwrap_or(false)) {
        (Some(code), _) => vec![dataset.summarize(
            &region_name(cfs, Some(code.as_str())),
            Some(code.as_str()),
        )],
        (None, true) => {
            if dataset.instrument().country_field.is_none() {
                warn!(
                    "summarize_source: instrument {} has no country field, not splitting",
                    instrument.name
                );
            }
            let codes = dataset.country_codes();
            if codes.is_empty() {
                vec![dataset.summarize(&region_name(cfs, None), None)]
            } else {
                let mut summaries: Vec<RegionSummary> = codes
                    .iter()
                    .map(|code| {
                        let name = instruments::country_name(code)
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| code.clone());
                        dataset.summarize(&name, Some(code.as_str()))
                    })
                    .collect();
                let unattributed = dataset.unattributed();
                if !unattributed.is_empty() {
                    warn!(
                        "summarize_source: {} rejected records without a country",
                        unattributed.len()
                    );
                    summaries.push(summarize_respondents(
                        UNATTRIBUTED_REGION,
                        &[],
                        unattributed.len(),
                        dataset.instrument(),
                    ));
                }
                summaries
            }
        }
        (None, false) => vec![dataset.summarize(&region_name(cfs, None), None)],
    };
    Ok(res)
}

fn write_summary(pretty_js: &str, out: &Option<String>) -> SResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some("") => {}
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

/// Runs all the sources of a configuration and returns the summary.
///
/// Arguments:
/// * `config` the dashboard configuration
/// * `root_path` the directory against which the file paths of the sources are resolved
/// * `check_summary_path` a reference summary. If provided, the run fails when the
/// calculated summary is different.
/// * `out` where to write the summary. Overrides the output file of the configuration.
pub fn run_dashboard_config(
    config: &DashboardConfig,
    root_path: &Path,
    check_summary_path: Option<String>,
    out: Option<String>,
) -> SResult<JSValue> {
    info!("config: {:?}", config);

    // Validate the rules before reading anything:
    let policy = validate_rules(&config.rules)?;
    for cfs in config.sources.iter() {
        get_instrument(cfs)?;
    }

    if config.sources.is_empty() {
        whatever!("no data source in the configuration");
    }

    let mut summaries: Vec<RegionSummary> = Vec::new();
    for cfs in config.sources.iter() {
        let mut s = summarize_source(root_path, cfs, policy)?;
        summaries.append(&mut s);
    }

    // Assemble the final json
    let result_js = build_summary_js(config, &summaries);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;

    let out_path = match out {
        Some(o) => Some(o),
        None => config
            .output_settings
            .output_file
            .as_ref()
            .map(|f| root_path.join(f).display().to_string()),
    };
    write_summary(&pretty_js_stats, &out_path)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(result_js)
}

/// Reads a configuration file and runs it. The paths of the sources are relative
/// to the directory of the configuration.
///
/// The data source and the validation mode of the configuration may be replaced.
pub fn run_dashboard(
    config_path: String,
    check_summary_path: Option<String>,
    out: Option<String>,
    source_override: Option<FileSource>,
    validation_override: Option<String>,
) -> SResult<JSValue> {
    let config_p = Path::new(config_path.as_str());
    let mut config = read_config(&config_path)?;
    if let Some(cfs) = source_override {
        config.sources = vec![cfs];
    }
    if validation_override.is_some() {
        config.rules.validation = validation_override;
    }
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    run_dashboard_config(&config, root_p, check_summary_path, out)
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> SResult<JSValue> {
    let _ = env_logger::builder().is_test(true).try_init();
    let test_dir = format!("{}/tests", env!("CARGO_MANIFEST_DIR"));
    info!("Running test {}", test_name);
    run_dashboard(
        format!("{}/{}/{}_config.json", test_dir, test_name, test_name),
        Some(format!(
            "{}/{}/{}_expected_summary.json",
            test_dir, test_name, test_name
        )),
        Some("".to_string()),
        None,
        None,
    )
}
