mod config;
pub mod builder;
pub mod instruments;
pub mod manual;
use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use crate::config::*;

/// Number of decimals kept in percentages and in the averages of a summary.
pub const DECIMAL_PLACES: u32 = 2;

/// Score of a knowledge question, per kind of answer.
const SCORE_CORRECT: f64 = 4.0;
const SCORE_DONT_KNOW: f64 = 2.5;
const SCORE_INCORRECT: f64 = 0.0;

// **** Aggregators ****

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Arithmetic mean of a numeric field or computed expression.
///
/// Records for which the selector has no value are skipped.
/// Returns `None` if no record has a value, in particular for empty inputs.
pub fn average<T>(records: &[T], selector: impl Fn(&T) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| selector(r))
        .filter(|x| x.is_finite())
        .collect();
    mean(&values)
}

/// Share of the records matching a predicate, in percent, rounded to `DECIMAL_PLACES`.
///
/// Returns `None` for empty inputs.
pub fn percentage<T>(records: &[T], predicate: impl Fn(&T) -> bool) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let hits = records.iter().filter(|r| predicate(*r)).count();
    Some(round_to(
        hits as f64 / records.len() as f64 * 100.0,
        DECIMAL_PLACES,
    ))
}

/// Groups records into named buckets and applies an aggregator to each bucket.
///
/// Every record for which `bucket_fn` returns a label lands in exactly one bucket,
/// the others are left out. The declared labels always come first, in order, even
/// when they have no member. Other labels follow in order of first appearance.
pub fn bucket_by<'a, T, R>(
    records: &'a [T],
    declared: &[String],
    bucket_fn: impl Fn(&T) -> Option<String>,
    aggregator: impl Fn(&[&'a T]) -> R,
) -> Vec<Bucket<R>> {
    let mut labels: Vec<String> = declared.to_vec();
    let mut positions: HashMap<String, usize> = labels
        .iter()
        .enumerate()
        .map(|(idx, l)| (l.clone(), idx))
        .collect();
    let mut groups: Vec<Vec<&'a T>> = labels.iter().map(|_| Vec::new()).collect();

    for r in records.iter() {
        if let Some(label) = bucket_fn(r) {
            let idx = match positions.get(&label) {
                Some(idx) => *idx,
                None => {
                    debug!("bucket_by: undeclared bucket {:?}", label);
                    positions.insert(label.clone(), labels.len());
                    labels.push(label);
                    groups.push(Vec::new());
                    labels.len() - 1
                }
            };
            groups[idx].push(r);
        }
    }

    labels
        .into_iter()
        .zip(groups.iter())
        .map(|(label, members)| Bucket {
            label,
            count: members.len(),
            value: aggregator(members),
        })
        .collect()
}

/// Number of records per category.
pub fn distribution<T>(
    records: &[T],
    declared: &[String],
    key: impl Fn(&T) -> Option<String>,
) -> Vec<(String, usize)> {
    bucket_by(records, declared, key, |members| members.len())
        .into_iter()
        .map(|b| (b.label, b.count))
        .collect()
}

/// The mean of the fields of one subscale.
///
/// Returns `None` if the subscale is empty or if one of its fields has no value.
pub fn composite_score(record: &SurveyRecord, fields: &[String]) -> Option<f64> {
    let mut values: Vec<f64> = Vec::new();
    for code in fields {
        values.push(record.number(code)?);
    }
    mean(&values)
}

/// Knowledge score on a 0-100 scale.
///
/// A correct answer is worth 4 points, a "don't know" 2.5 and an incorrect
/// answer nothing. The total is normalized by the maximum score of the key.
pub fn weighted_knowledge_score(record: &SurveyRecord, key: &AnswerKey) -> Option<f64> {
    if key.items.is_empty() {
        return None;
    }
    let mut total = 0.0;
    for (code, correct) in key.items.iter() {
        let answer = record.number(code)?;
        total += if answer == *correct {
            SCORE_CORRECT
        } else if answer == key.dont_know {
            SCORE_DONT_KNOW
        } else {
            SCORE_INCORRECT
        };
    }
    Some(total / (SCORE_CORRECT * key.items.len() as f64) * 100.0)
}

pub fn bmi(record: &SurveyRecord, weight: &str, height_cm: &str) -> Option<f64> {
    let w = record.number(weight)?;
    let h = record.number(height_cm)? / 100.0;
    if h <= 0.0 {
        None
    } else {
        Some(w / (h * h))
    }
}

impl Metric {
    pub fn evaluate(&self, record: &SurveyRecord) -> Option<f64> {
        match self {
            Metric::Field(code) => record.number(code),
            Metric::Composite(codes) => composite_score(record, codes),
            Metric::Bmi { weight, height_cm } => bmi(record, weight, height_cm),
            Metric::Knowledge(key) => weighted_knowledge_score(record, key),
        }
    }
}

// **** Validation ****

fn check_value(value: Option<&FieldValue>, spec: &FieldSpec) -> Option<Problem> {
    let value = match value {
        None | Some(FieldValue::Missing) => {
            return if spec.required {
                Some(Problem::Missing)
            } else {
                None
            };
        }
        Some(FieldValue::Text(s)) if s.trim().is_empty() => {
            return if spec.required {
                Some(Problem::Missing)
            } else {
                None
            };
        }
        Some(v) => v,
    };

    match (&spec.kind, value) {
        (FieldKind::Text, _) => None,
        (_, FieldValue::Text(s)) => Some(Problem::NotNumeric(s.clone())),
        (FieldKind::Likert { min, max }, FieldValue::Number(x))
        | (FieldKind::Numeric { min, max }, FieldValue::Number(x)) => {
            if x.is_finite() && *min <= *x && *x <= *max {
                None
            } else {
                Some(Problem::OutOfRange(*x))
            }
        }
        (FieldKind::Categorical(codes), FieldValue::Number(x)) => {
            if codes.iter().any(|c| c == x) {
                None
            } else {
                Some(Problem::UnknownCode(*x))
            }
        }
        (_, FieldValue::Missing) => None,
    }
}

/// All the problems of a record with respect to the fields of an instrument.
pub fn validate_record(record: &SurveyRecord, fields: &[FieldSpec]) -> Vec<RecordIssue> {
    fields
        .iter()
        .filter_map(|spec| {
            check_value(record.get(&spec.code), spec).map(|problem| RecordIssue {
                field: spec.code.clone(),
                problem,
            })
        })
        .collect()
}

// **** Datasets ****

/// A validated record and the metrics derived from it.
#[derive(PartialEq, Debug, Clone)]
pub struct Respondent {
    pub record: SurveyRecord,
    // Only the metrics that could be computed for this record.
    metrics: BTreeMap<String, f64>,
}

impl Respondent {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).cloned()
    }
}

/// An immutable snapshot of the records of one data source, validated and derived
/// once against an instrument.
#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    instrument: Instrument,
    respondents: Vec<Respondent>,
    rejected: Vec<RejectedRecord>,
}

impl Dataset {
    /// Validates the records and derives all the metrics of the instrument.
    pub fn load(
        records: Vec<SurveyRecord>,
        instrument: &Instrument,
        policy: ValidationPolicy,
    ) -> Result<Dataset, MetricsErrors> {
        instrument.check()?;
        info!(
            "Loading {:?} records with instrument {:?}, policy: {:?}",
            records.len(),
            instrument.name,
            policy
        );

        let mut respondents: Vec<Respondent> = Vec::new();
        let mut rejected: Vec<RejectedRecord> = Vec::new();
        for record in records {
            let issues = validate_record(&record, &instrument.fields);
            if let Some(issue) = issues.first() {
                match policy {
                    ValidationPolicy::FailFast => {
                        return Err(MetricsErrors::InvalidRecord {
                            record_id: record.id.clone(),
                            issue: issue.clone(),
                        });
                    }
                    ValidationPolicy::Flag => {
                        warn!(
                            "Dataset::load: record {}: rejected: {}",
                            record.id,
                            issues
                                .iter()
                                .map(|i| i.to_string())
                                .collect::<Vec<String>>()
                                .join(", ")
                        );
                        rejected.push(RejectedRecord { record, issues });
                        continue;
                    }
                }
            }

            let metrics: BTreeMap<String, f64> = instrument
                .metrics
                .iter()
                .filter_map(|(name, m)| m.evaluate(&record).map(|v| (name.clone(), v)))
                .collect();
            debug!("Dataset::load: record {}: metrics {:?}", record.id, metrics);
            respondents.push(Respondent { record, metrics });
        }

        info!(
            "Loaded {:?} respondents, rejected {:?} records",
            respondents.len(),
            rejected.len()
        );
        Ok(Dataset {
            instrument: instrument.clone(),
            respondents,
            rejected,
        })
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn respondents(&self) -> &[Respondent] {
        &self.respondents
    }

    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    fn in_country(&self, record: &SurveyRecord, code: &str) -> bool {
        match &self.instrument.country_field {
            Some(field) => record.get(field).map_or(false, |v| v.matches_code(code)),
            None => false,
        }
    }

    /// The respondents of one country.
    ///
    /// Empty if the instrument does not record a country.
    pub fn select_country(&self, code: &str) -> Vec<&Respondent> {
        self.respondents
            .iter()
            .filter(|r| self.in_country(&r.record, code))
            .collect()
    }

    fn country_of(&self, record: &SurveyRecord) -> Option<String> {
        let field = self.instrument.country_field.as_ref()?;
        record.get(field).and_then(|v| v.label())
    }

    /// The distinct country codes of the records, sorted.
    ///
    /// Countries whose records were all rejected are included.
    pub fn country_codes(&self) -> Vec<String> {
        let codes: BTreeSet<String> = self
            .respondents
            .iter()
            .map(|r| &r.record)
            .chain(self.rejected.iter().map(|r| &r.record))
            .filter_map(|r| self.country_of(r))
            .collect();
        codes.into_iter().collect()
    }

    /// The rejected records that do not declare a country.
    ///
    /// They belong to no country summary.
    pub fn unattributed(&self) -> Vec<&RejectedRecord> {
        self.rejected
            .iter()
            .filter(|r| self.country_of(&r.record).is_none())
            .collect()
    }

    /// Summary of all the respondents, or of the respondents of one country.
    pub fn summarize(&self, region: &str, country: Option<&str>) -> RegionSummary {
        let (selected, rejected) = match country {
            Some(code) => (
                self.select_country(code),
                self.rejected
                    .iter()
                    .filter(|r| self.in_country(&r.record, code))
                    .count(),
            ),
            None => (self.respondents.iter().collect(), self.rejected.len()),
        };
        info!(
            "Summarizing region {:?} (country: {:?}): {:?} respondents",
            region,
            country,
            selected.len()
        );
        summarize_respondents(region, &selected, rejected, &self.instrument)
    }
}

fn rounded(x: Option<f64>) -> Option<f64> {
    x.map(|v| round_to(v, DECIMAL_PLACES))
}

fn average_metric(respondents: &[&Respondent], name: &str) -> Option<f64> {
    rounded(average(respondents, |r| r.metric(name)))
}

/// Computes the summary of a group of respondents, as described by the instrument.
pub fn summarize_respondents(
    region: &str,
    respondents: &[&Respondent],
    rejected: usize,
    instrument: &Instrument,
) -> RegionSummary {
    let average_usage_hours = instrument
        .usage_metric
        .as_ref()
        .and_then(|m| average_metric(respondents, m));
    let average_wellbeing = instrument
        .wellbeing_metric
        .as_ref()
        .and_then(|m| average_metric(respondents, m));

    let distribution = match &instrument.distribution_field {
        Some(field) => {
            let declared: Vec<String> = instrument
                .distribution_labels
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            distribution(respondents, &declared, |r| {
                let v = r.record.get(field)?;
                let named = v.as_number().and_then(|x| {
                    instrument
                        .distribution_labels
                        .iter()
                        .find(|(code, _)| *code == x)
                        .map(|(_, l)| l.clone())
                });
                named.or_else(|| v.label())
            })
        }
        None => Vec::new(),
    };

    let indicators: Vec<(String, Option<f64>)> = instrument
        .indicators
        .iter()
        .map(|ind| {
            // Only the respondents with a value take part in the percentage.
            let values: Vec<f64> = respondents
                .iter()
                .filter_map(|r| r.metric(&ind.metric))
                .collect();
            (
                ind.name.clone(),
                percentage(&values, |v| *v >= ind.at_least),
            )
        })
        .collect();

    let metrics: Vec<(String, Option<f64>)> = instrument
        .reported_metrics
        .iter()
        .map(|name| (name.clone(), average_metric(respondents, name)))
        .collect();

    let mut cross_tabs: Vec<CrossTab> = Vec::new();
    for ct in instrument.cross_tabs.iter() {
        // Checked when the dataset was loaded.
        if let Some(dimension) = instrument.dimension(&ct.dimension) {
            let buckets = bucket_by(
                respondents,
                &dimension.labels(),
                |r| {
                    r.metric(&dimension.metric)
                        .and_then(|v| dimension.bucket_for(v))
                },
                |members| rounded(average(members, |r| r.metric(&ct.metric))),
            );
            cross_tabs.push(CrossTab {
                dimension: ct.dimension.clone(),
                metric: ct.metric.clone(),
                buckets,
            });
        }
    }

    RegionSummary {
        region: region.to_string(),
        instrument: instrument.name.clone(),
        participants: respondents.len(),
        rejected,
        average_usage_hours,
        average_wellbeing,
        distribution,
        indicators,
        metrics,
        cross_tabs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn health(values: &[f64]) -> Vec<SurveyRecord> {
        values
            .iter()
            .enumerate()
            .map(|(idx, v)| SurveyRecord::new(&format!("r{}", idx)).with_number("B3", *v))
            .collect()
    }

    #[test]
    fn empty_inputs_give_no_value() {
        let empty: Vec<SurveyRecord> = Vec::new();
        assert_eq!(average(&empty, |r| r.number("B3")), None);
        assert_eq!(percentage(&empty, |_| true), None);
        assert_eq!(composite_score(&SurveyRecord::new("x"), &[]), None);
        let key = AnswerKey {
            items: vec![],
            dont_know: 3.0,
        };
        assert_eq!(weighted_knowledge_score(&SurveyRecord::new("x"), &key), None);
        let buckets = bucket_by(&empty, &["a".to_string()], |_| None, |m| {
            average(m, |r| r.number("B3"))
        });
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 0);
        assert_eq!(buckets[0].value, None);
    }

    #[test]
    fn average_skips_missing_values() {
        let mut records = health(&[4.0, 2.0]);
        records.push(SurveyRecord::new("blank"));
        assert_eq!(average(&records, |r| r.number("B3")), Some(3.0));
    }

    #[test]
    fn percentage_good_health() {
        let records = health(&[5.0, 4.0, 3.0, 1.0]);
        assert_eq!(
            percentage(&records, |r| r.number("B3").map_or(false, |v| v >= 4.0)),
            Some(50.0)
        );
    }

    #[test]
    fn percentage_always_true() {
        for n in 1..8 {
            let values: Vec<f64> = (0..n).map(|x| x as f64).collect();
            assert_eq!(percentage(&health(&values), |_| true), Some(100.0));
        }
    }

    #[test]
    fn percentage_is_rounded() {
        let records = health(&[5.0, 1.0, 1.0]);
        assert_eq!(
            percentage(&records, |r| r.number("B3") == Some(5.0)),
            Some(33.33)
        );
    }

    #[test]
    fn composite_of_equal_items() {
        let fields: Vec<String> = (1..=14).map(|i| format!("B11_{}", i)).collect();
        for v in [0.0, 1.0, 2.5, 5.0] {
            let mut r = SurveyRecord::new("x");
            for f in fields.iter() {
                r.insert(f, FieldValue::Number(v));
            }
            assert_eq!(composite_score(&r, &fields), Some(v));
            assert_eq!(composite_score(&r, &fields[..3]), Some(v));
        }
    }

    #[test]
    fn composite_needs_all_items() {
        let r = SurveyRecord::new("x")
            .with_number("B11_1", 3.0)
            .with_text("B11_2", "often");
        let fields = vec!["B11_1".to_string(), "B11_2".to_string()];
        assert_eq!(composite_score(&r, &fields), None);
    }

    #[test]
    fn knowledge_scores() {
        let key = AnswerKey {
            items: vec![("D1".to_string(), 2.0), ("D2".to_string(), 1.0)],
            dont_know: 3.0,
        };
        let correct = SurveyRecord::new("a")
            .with_number("D1", 2.0)
            .with_number("D2", 1.0);
        let dont_know = SurveyRecord::new("b")
            .with_number("D1", 3.0)
            .with_number("D2", 3.0);
        let incorrect = SurveyRecord::new("c")
            .with_number("D1", 1.0)
            .with_number("D2", 2.0);
        let mixed = SurveyRecord::new("d")
            .with_number("D1", 2.0)
            .with_number("D2", 3.0);
        assert_eq!(weighted_knowledge_score(&correct, &key), Some(100.0));
        assert_eq!(weighted_knowledge_score(&dont_know, &key), Some(62.5));
        assert_eq!(weighted_knowledge_score(&incorrect, &key), Some(0.0));
        assert_eq!(weighted_knowledge_score(&mixed, &key), Some(81.25));
        assert_eq!(
            weighted_knowledge_score(&SurveyRecord::new("e").with_number("D1", 2.0), &key),
            None
        );
    }

    #[test]
    fn bmi_from_centimetres() {
        let r = SurveyRecord::new("x")
            .with_number("W", 80.0)
            .with_number("H", 200.0);
        assert_eq!(bmi(&r, "W", "H"), Some(20.0));
        let r0 = SurveyRecord::new("y")
            .with_number("W", 80.0)
            .with_number("H", 0.0);
        assert_eq!(bmi(&r0, "W", "H"), None);
    }

    #[test]
    fn buckets_partition_records() {
        let ages = [18.0, 22.0, 30.0, 41.0, 47.0, 59.0, 64.0, 65.0, 88.0];
        let records: Vec<SurveyRecord> = ages
            .iter()
            .enumerate()
            .map(|(idx, a)| SurveyRecord::new(&idx.to_string()).with_number("A1", *a))
            .collect();
        let dim = Dimension {
            name: "age_band".to_string(),
            metric: "age".to_string(),
            scheme: BucketScheme::Ranges(vec![
                RangeBucket {
                    label: "18-39".to_string(),
                    min: 18.0,
                    max: Some(40.0),
                },
                RangeBucket {
                    label: "40-64".to_string(),
                    min: 40.0,
                    max: Some(65.0),
                },
                RangeBucket {
                    label: "65+".to_string(),
                    min: 65.0,
                    max: None,
                },
            ]),
        };
        let buckets = bucket_by(
            &records,
            &dim.labels(),
            |r| r.number("A1").and_then(|a| dim.bucket_for(a)),
            |m| m.len(),
        );
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![3, 4, 2]);
        assert_eq!(counts.iter().sum::<usize>(), records.len());
        assert!(buckets.iter().all(|b| b.count == b.value));
    }

    #[test]
    fn undeclared_buckets_are_appended() {
        let records = vec![
            SurveyRecord::new("1").with_text("C", "TH"),
            SurveyRecord::new("2").with_text("C", "SG"),
            SurveyRecord::new("3").with_text("C", "TH"),
            SurveyRecord::new("4"),
        ];
        let d = distribution(&records, &["MY".to_string()], |r| {
            r.get("C").and_then(|v| v.label())
        });
        assert_eq!(
            d,
            vec![
                ("MY".to_string(), 0),
                ("TH".to_string(), 2),
                ("SG".to_string(), 1)
            ]
        );
    }

    #[test]
    fn validation_problems() {
        let instrument = instruments::asean();
        let r = SurveyRecord::new("x")
            .with_text("B3", "good")
            .with_number("A6", 30.0)
            .with_number("B5", 9.0);
        let issues = validate_record(&r, &instrument.fields);
        assert!(issues.contains(&RecordIssue {
            field: "B3".to_string(),
            problem: Problem::NotNumeric("good".to_string())
        }));
        assert!(issues.contains(&RecordIssue {
            field: "A6".to_string(),
            problem: Problem::OutOfRange(30.0)
        }));
        assert!(issues.contains(&RecordIssue {
            field: "B5".to_string(),
            problem: Problem::UnknownCode(9.0)
        }));
        assert!(issues.contains(&RecordIssue {
            field: "HQ_COUNTRY".to_string(),
            problem: Problem::Missing
        }));
        // Optional fields may be absent.
        assert!(!issues.iter().any(|i| i.field == "A7"));
    }

    fn asean_record(id: &str, country: &str, health: f64, wellbeing: f64) -> SurveyRecord {
        let mut r = SurveyRecord::new(id)
            .with_text("HQ_COUNTRY", country)
            .with_number("A1", 30.0)
            .with_number("A6", 2.0)
            .with_number("B3", health);
        for i in 1..=14 {
            r.insert(&format!("B11_{}", i), FieldValue::Number(wellbeing));
        }
        r
    }

    #[test]
    fn fail_fast_stops_at_invalid_record() {
        init();
        let records = vec![
            asean_record("ok", "TH", 4.0, 3.0),
            asean_record("bad", "TH", 9.0, 3.0),
        ];
        let res = Dataset::load(records, &instruments::asean(), ValidationPolicy::FailFast);
        assert_eq!(
            res,
            Err(MetricsErrors::InvalidRecord {
                record_id: "bad".to_string(),
                issue: RecordIssue {
                    field: "B3".to_string(),
                    problem: Problem::OutOfRange(9.0)
                }
            })
        );
    }

    #[test]
    fn flag_excludes_invalid_records() {
        init();
        let records = vec![
            asean_record("a", "TH", 5.0, 4.0),
            asean_record("b", "TH", 3.0, 2.0),
            asean_record("bad", "TH", 9.0, 3.0),
            asean_record("c", "MY", 1.0, 1.0),
        ];
        let ds = Dataset::load(records, &instruments::asean(), ValidationPolicy::Flag).unwrap();
        assert_eq!(ds.respondents().len(), 3);
        assert_eq!(ds.rejected().len(), 1);
        assert_eq!(ds.rejected()[0].record.id, "bad");
        assert_eq!(ds.country_codes(), vec!["MY".to_string(), "TH".to_string()]);

        let th = ds.summarize("Thailand", Some("TH"));
        assert_eq!(th.participants, 2);
        assert_eq!(th.rejected, 1);
        assert_eq!(th.average_wellbeing, Some(3.0));
        assert_eq!(th.average_usage_hours, Some(2.0));
        assert_eq!(
            th.indicators.iter().find(|(n, _)| n == "good_health"),
            Some(&("good_health".to_string(), Some(50.0)))
        );

        let my = ds.summarize("Malaysia", Some("MY"));
        assert_eq!(my.participants, 1);
        assert_eq!(my.rejected, 0);

        let nobody = ds.summarize("Vietnam", Some("VN"));
        assert_eq!(nobody.participants, 0);
        assert_eq!(nobody.average_wellbeing, None);
        assert!(nobody.indicators.iter().all(|(_, v)| v.is_none()));
        // Empty buckets are still reported.
        for ct in nobody.cross_tabs.iter() {
            assert!(!ct.buckets.is_empty());
            assert!(ct.buckets.iter().all(|b| b.count == 0 && b.value.is_none()));
        }
    }

    #[test]
    fn rejected_records_are_attributed() {
        init();
        let mut no_country = asean_record("nowhere", "TH", 4.0, 3.0);
        no_country.insert("HQ_COUNTRY", FieldValue::Missing);
        let records = vec![
            asean_record("th", "TH", 4.0, 3.0),
            asean_record("vn", "VN", 9.0, 3.0),
            no_country,
        ];
        let ds = Dataset::load(records, &instruments::asean(), ValidationPolicy::Flag).unwrap();
        assert_eq!(ds.instrument().name, "asean");
        assert_eq!(ds.rejected().len(), 2);
        // Vietnam has no valid record but still has a summary.
        assert_eq!(ds.country_codes(), vec!["TH".to_string(), "VN".to_string()]);
        let vn = ds.summarize("Vietnam", Some("VN"));
        assert_eq!(vn.participants, 0);
        assert_eq!(vn.rejected, 1);

        let unattributed = ds.unattributed();
        assert_eq!(unattributed.len(), 1);
        assert_eq!(unattributed[0].record.id, "nowhere");
        let per_country: usize = ds
            .country_codes()
            .iter()
            .map(|c| ds.summarize(c, Some(c.as_str())).rejected)
            .sum();
        assert_eq!(per_country + unattributed.len(), ds.rejected().len());
    }

    #[test]
    fn cross_tab_by_age() {
        let mut young = asean_record("young", "TH", 4.0, 4.0);
        young.insert("A1", FieldValue::Number(20.0));
        let mut old = asean_record("old", "TH", 4.0, 2.0);
        old.insert("A1", FieldValue::Number(70.0));
        let ds = Dataset::load(
            vec![young, old],
            &instruments::asean(),
            ValidationPolicy::FailFast,
        )
        .unwrap();
        let s = ds.summarize("Thailand", None);
        let ct = s
            .cross_tabs
            .iter()
            .find(|c| c.dimension == "age_band" && c.metric == "overall_wellbeing")
            .unwrap();
        assert_eq!(ct.buckets.first().map(|b| b.value), Some(Some(4.0)));
        assert_eq!(ct.buckets.last().map(|b| b.value), Some(Some(2.0)));
        assert_eq!(ct.buckets.iter().map(|b| b.count).sum::<usize>(), 2);
    }
}
