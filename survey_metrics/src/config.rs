// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// The content of one answer in a survey record.
#[derive(PartialEq, Debug, Clone)]
pub enum FieldValue {
    /// A numeric code: Likert level, categorical code, count, measurement.
    Number(f64),
    /// Free-form or derived text, such as a country code.
    Text(String),
    /// The respondent did not answer, or the cell was empty.
    Missing,
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(x) if x.is_finite() => Some(*x),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Compares the value with a code written as text ("TH", "3").
    pub fn matches_code(&self, code: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.trim() == code.trim(),
            FieldValue::Number(x) => code.trim().parse::<f64>().map_or(false, |c| c == *x),
            FieldValue::Missing => false,
        }
    }

    /// The label of a value when it is used as a category.
    pub fn label(&self) -> Option<String> {
        match self {
            FieldValue::Number(x) if x.is_finite() => Some(code_label(*x)),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) if s.trim().is_empty() => None,
            FieldValue::Text(s) => Some(s.trim().to_string()),
            FieldValue::Missing => None,
        }
    }
}

/// Integral codes are written without a decimal part.
pub fn code_label(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        x.to_string()
    }
}

/// One respondent's answers for a given survey instrument.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyRecord {
    pub id: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl SurveyRecord {
    pub fn new(id: &str) -> SurveyRecord {
        SurveyRecord {
            id: id.to_string(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_number(mut self, code: &str, value: f64) -> SurveyRecord {
        self.insert(code, FieldValue::Number(value));
        self
    }

    pub fn with_text(mut self, code: &str, value: &str) -> SurveyRecord {
        self.insert(code, FieldValue::Text(value.to_string()));
        self
    }

    pub fn insert(&mut self, code: &str, value: FieldValue) {
        self.fields.insert(code.to_string(), value);
    }

    pub fn get(&self, code: &str) -> Option<&FieldValue> {
        self.fields.get(code)
    }

    pub fn number(&self, code: &str) -> Option<f64> {
        self.fields.get(code).and_then(FieldValue::as_number)
    }
}

// ********* Instruments **********

/// The kind of answer expected in a field, used by the validation at load time.
#[derive(PartialEq, Debug, Clone)]
pub enum FieldKind {
    /// A Likert item, with inclusive bounds.
    Likert { min: f64, max: f64 },
    /// Any number within inclusive bounds (hours, age, weight).
    Numeric { min: f64, max: f64 },
    /// One of a closed set of codes.
    Categorical(Vec<f64>),
    /// Anything that is not empty.
    Text,
}

#[derive(PartialEq, Debug, Clone)]
pub struct FieldSpec {
    pub code: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Scoring of a knowledge assessment.
///
/// Every item is a field code and the code of the correct answer.
/// Answering the `dont_know` code is worth partial credit.
#[derive(PartialEq, Debug, Clone)]
pub struct AnswerKey {
    pub items: Vec<(String, f64)>,
    pub dont_know: f64,
}

/// How a named quantity is extracted from a record.
#[derive(PartialEq, Debug, Clone)]
pub enum Metric {
    /// The numeric value of a single field.
    Field(String),
    /// A subscale score: the mean of a fixed list of fields.
    Composite(Vec<String>),
    /// Body mass index from a weight in kilograms and a height in centimetres.
    Bmi { weight: String, height_cm: String },
    /// Weighted knowledge score on a 0-100 scale.
    Knowledge(AnswerKey),
}

impl Metric {
    /// The field codes read by this metric.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Metric::Field(code) => vec![code.clone()],
            Metric::Composite(codes) => codes.clone(),
            Metric::Bmi { weight, height_cm } => vec![weight.clone(), height_cm.clone()],
            Metric::Knowledge(key) => key.items.iter().map(|(code, _)| code.clone()).collect(),
        }
    }
}

/// Percentage of respondents for whom a metric is at least a threshold.
#[derive(PartialEq, Debug, Clone)]
pub struct Indicator {
    pub name: String,
    pub metric: String,
    pub at_least: f64,
}

/// A half-open range `[min, max)`. Without a maximum, the range is unbounded.
#[derive(PartialEq, Debug, Clone)]
pub struct RangeBucket {
    pub label: String,
    pub min: f64,
    pub max: Option<f64>,
}

/// Several codes may be grouped under one label (income tiers).
#[derive(PartialEq, Debug, Clone)]
pub struct CodeBucket {
    pub label: String,
    pub codes: Vec<f64>,
}

#[derive(PartialEq, Debug, Clone)]
pub enum BucketScheme {
    Ranges(Vec<RangeBucket>),
    Codes(Vec<CodeBucket>),
}

/// A demographic dimension: a metric and the named buckets it falls into.
#[derive(PartialEq, Debug, Clone)]
pub struct Dimension {
    pub name: String,
    pub metric: String,
    pub scheme: BucketScheme,
}

impl Dimension {
    pub fn labels(&self) -> Vec<String> {
        match &self.scheme {
            BucketScheme::Ranges(l) => l.iter().map(|b| b.label.clone()).collect(),
            BucketScheme::Codes(l) => l.iter().map(|b| b.label.clone()).collect(),
        }
    }

    /// The bucket a value falls into. The first matching bucket wins.
    pub fn bucket_for(&self, value: f64) -> Option<String> {
        match &self.scheme {
            BucketScheme::Ranges(l) => l
                .iter()
                .find(|b| b.min <= value && b.max.map_or(true, |m| value < m))
                .map(|b| b.label.clone()),
            BucketScheme::Codes(l) => l
                .iter()
                .find(|b| b.codes.iter().any(|c| *c == value))
                .map(|b| b.label.clone()),
        }
    }
}

/// A metric averaged within each bucket of a dimension.
#[derive(PartialEq, Debug, Clone)]
pub struct CrossTabSpec {
    pub dimension: String,
    pub metric: String,
}

/// The schema mapping of one survey instrument.
///
/// It names the fields of the instrument, how they are validated and how
/// the semantic quantities (metrics) are extracted from them. All the
/// region summaries are computed from this description.
#[derive(PartialEq, Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldSpec>,
    pub metrics: Vec<(String, Metric)>,
    /// The field holding the country code in a dataset shared across countries.
    pub country_field: Option<String>,
    pub usage_metric: Option<String>,
    pub wellbeing_metric: Option<String>,
    pub distribution_field: Option<String>,
    /// Display labels of the codes of the distribution field, in display order.
    pub distribution_labels: Vec<(f64, String)>,
    pub indicators: Vec<Indicator>,
    /// The metrics averaged in a region summary.
    pub reported_metrics: Vec<String>,
    pub dimensions: Vec<Dimension>,
    pub cross_tabs: Vec<CrossTabSpec>,
}

impl Instrument {
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }

    pub fn field(&self, code: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.code == code)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Checks that every name referenced by the instrument is defined.
    pub fn check(&self) -> Result<(), MetricsErrors> {
        if self.fields.is_empty() || self.metrics.is_empty() {
            return Err(MetricsErrors::EmptyInstrument);
        }
        for (idx, (name, metric)) in self.metrics.iter().enumerate() {
            if self.metrics[..idx].iter().any(|(n, _)| n == name) {
                return Err(MetricsErrors::DuplicateMetric(name.clone()));
            }
            for code in metric.fields() {
                if self.field(&code).is_none() {
                    return Err(MetricsErrors::UnknownField(code));
                }
            }
        }
        let mut fields: Vec<&String> = Vec::new();
        fields.extend(self.country_field.iter());
        fields.extend(self.distribution_field.iter());
        for code in fields {
            if self.field(code).is_none() {
                return Err(MetricsErrors::UnknownField(code.clone()));
            }
        }

        let mut metrics: Vec<&String> = Vec::new();
        metrics.extend(self.usage_metric.iter());
        metrics.extend(self.wellbeing_metric.iter());
        metrics.extend(self.reported_metrics.iter());
        metrics.extend(self.indicators.iter().map(|i| &i.metric));
        metrics.extend(self.dimensions.iter().map(|d| &d.metric));
        metrics.extend(self.cross_tabs.iter().map(|c| &c.metric));
        for name in metrics {
            if self.metric(name).is_none() {
                return Err(MetricsErrors::UnknownMetric(name.clone()));
            }
        }
        for ct in self.cross_tabs.iter() {
            if self.dimension(&ct.dimension).is_none() {
                return Err(MetricsErrors::UnknownDimension(ct.dimension.clone()));
            }
        }
        Ok(())
    }
}

/// What to do with records that do not match the instrument.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ValidationPolicy {
    /// Stop at the first invalid record.
    FailFast,
    /// Exclude the invalid records from the aggregates and keep them aside.
    Flag,
}

#[derive(PartialEq, Debug, Clone)]
pub enum Problem {
    Missing,
    NotNumeric(String),
    OutOfRange(f64),
    UnknownCode(f64),
}

#[derive(PartialEq, Debug, Clone)]
pub struct RecordIssue {
    pub field: String,
    pub problem: Problem,
}

impl Display for RecordIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.problem {
            Problem::Missing => write!(f, "field {}: missing answer", self.field),
            Problem::NotNumeric(s) => write!(f, "field {}: expected a number, got {:?}", self.field, s),
            Problem::OutOfRange(x) => write!(f, "field {}: value {} out of range", self.field, x),
            Problem::UnknownCode(x) => write!(f, "field {}: unknown code {}", self.field, x),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct RejectedRecord {
    pub record: SurveyRecord,
    pub issues: Vec<RecordIssue>,
}

// ******** Output data structures *********

/// One group of a bucketing, with the number of members and the aggregated value.
#[derive(PartialEq, Debug, Clone)]
pub struct Bucket<R> {
    pub label: String,
    pub count: usize,
    pub value: R,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CrossTab {
    pub dimension: String,
    pub metric: String,
    pub buckets: Vec<Bucket<Option<f64>>>,
}

/// Aggregated view of one country or region.
///
/// Values are `None` when no respondent contributes to them.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionSummary {
    pub region: String,
    pub instrument: String,
    pub participants: usize,
    pub rejected: usize,
    pub average_usage_hours: Option<f64>,
    pub average_wellbeing: Option<f64>,
    pub distribution: Vec<(String, usize)>,
    pub indicators: Vec<(String, Option<f64>)>,
    pub metrics: Vec<(String, Option<f64>)>,
    pub cross_tabs: Vec<CrossTab>,
}

/// Errors that prevent a dataset from being loaded or summarized.
#[derive(PartialEq, Debug, Clone)]
pub enum MetricsErrors {
    EmptyInstrument,
    UnknownMetric(String),
    UnknownField(String),
    UnknownDimension(String),
    DuplicateMetric(String),
    InvalidRecord {
        record_id: String,
        issue: RecordIssue,
    },
}

impl Error for MetricsErrors {}

impl Display for MetricsErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsErrors::EmptyInstrument => write!(f, "instrument has no fields or no metrics"),
            MetricsErrors::UnknownMetric(n) => write!(f, "unknown metric {}", n),
            MetricsErrors::UnknownField(n) => write!(f, "unknown field {}", n),
            MetricsErrors::UnknownDimension(n) => write!(f, "unknown dimension {}", n),
            MetricsErrors::DuplicateMetric(n) => write!(f, "metric {} defined twice", n),
            MetricsErrors::InvalidRecord { record_id, issue } => {
                write!(f, "invalid record {}: {}", record_id, issue)
            }
        }
    }
}
