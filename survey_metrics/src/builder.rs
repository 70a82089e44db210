pub use crate::config::*;
use crate::Dataset;

/// A builder for adding survey records.
///
/// ```
/// pub use survey_metrics::builder::Builder;
/// pub use survey_metrics::instruments;
/// # use survey_metrics::MetricsErrors;
///
/// let mut builder = Builder::new(&instruments::hong_kong())?;
///
/// let wellbeing: Vec<String> = (1..=14).map(|i| format!("B10_{}", i)).collect();
/// let mut answers: Vec<(&str, f64)> = vec![("A1", 42.0), ("B9_1", 4.0), ("B9_2", 1.5)];
/// for code in wellbeing.iter() {
///     answers.push((code.as_str(), 3.0));
/// }
/// builder.add_record_simple(&answers)?;
///
/// let dataset = builder.build()?;
/// let summary = dataset.summarize("Hong Kong", None);
/// assert_eq!(summary.participants, 1);
/// assert_eq!(summary.average_wellbeing, Some(3.0));
///
/// # Ok::<(), MetricsErrors>(())
/// ```
pub struct Builder {
    pub(crate) _instrument: Instrument,
    pub(crate) _policy: ValidationPolicy,
    pub(crate) _records: Vec<SurveyRecord>,
}

impl Builder {
    pub fn new(instrument: &Instrument) -> Result<Builder, MetricsErrors> {
        instrument.check()?;
        Ok(Builder {
            _instrument: instrument.clone(),
            _policy: ValidationPolicy::FailFast,
            _records: Vec::new(),
        })
    }

    pub fn policy(self, policy: ValidationPolicy) -> Result<Builder, MetricsErrors> {
        Ok(Builder {
            _instrument: self._instrument,
            _policy: policy,
            _records: self._records,
        })
    }

    /// Adds a record made of numeric answers only.
    ///
    /// An identifier is generated from the position of the record.
    pub fn add_record_simple(&mut self, answers: &[(&str, f64)]) -> Result<(), MetricsErrors> {
        let id = format!("record-{:08}", self._records.len() + 1);
        let values: Vec<(String, FieldValue)> = answers
            .iter()
            .map(|(code, v)| (code.to_string(), FieldValue::Number(*v)))
            .collect();
        self.add_record(&id, &values)
    }

    /// Adds a record.
    ///
    /// answers: the field codes and their values. Codes that do not belong to the
    /// instrument are kept but never read.
    pub fn add_record(
        &mut self,
        id: &str,
        answers: &[(String, FieldValue)],
    ) -> Result<(), MetricsErrors> {
        let mut record = SurveyRecord::new(id);
        for (code, value) in answers {
            record.insert(code, value.clone());
        }
        self.add_record_2(&record)
    }

    pub fn add_record_2(&mut self, record: &SurveyRecord) -> Result<(), MetricsErrors> {
        self._records.push(record.clone());
        Ok(())
    }

    /// Validates the records and derives the metrics.
    pub fn build(self) -> Result<Dataset, MetricsErrors> {
        Dataset::load(self._records, &self._instrument, self._policy)
    }
}
