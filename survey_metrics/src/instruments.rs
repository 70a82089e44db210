//! The survey instruments used across the regions.
//!
//! Each instrument is a field schema plus the mapping from field codes to
//! named quantities. Field groupings are fixed by the questionnaires.

pub use crate::config::*;

/// Countries of the shared ASEAN dataset: value of `HQ_COUNTRY` and display name.
pub const ASEAN_COUNTRIES: &[(&str, &str)] = &[
    ("ID", "Indonesia"),
    ("MY", "Malaysia"),
    ("PH", "Philippines"),
    ("SG", "Singapore"),
    ("TH", "Thailand"),
    ("VN", "Vietnam"),
];

pub const NAMES: &[&str] = &["asean", "hong_kong", "hong_kong_dementia"];

/// Looks up a built-in instrument.
pub fn by_name(name: &str) -> Option<Instrument> {
    match name {
        "asean" => Some(asean()),
        "hong_kong" => Some(hong_kong()),
        "hong_kong_dementia" => Some(hong_kong_dementia()),
        _ => None,
    }
}

pub fn country_name(code: &str) -> Option<&'static str> {
    ASEAN_COUNTRIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, n)| *n)
}

fn field(code: &str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        code: code.to_string(),
        kind,
        required,
    }
}

fn likert(code: &str, min: f64, max: f64) -> FieldSpec {
    field(code, FieldKind::Likert { min, max }, true)
}

fn codes(range: std::ops::RangeInclusive<u32>) -> Vec<f64> {
    range.map(|c| c as f64).collect()
}

/// Item codes `{prefix}_{first}` .. `{prefix}_{last}`.
fn items(prefix: &str, first: u32, last: u32) -> Vec<String> {
    (first..=last).map(|i| format!("{}_{}", prefix, i)).collect()
}

fn metric(name: &str, m: Metric) -> (String, Metric) {
    (name.to_string(), m)
}

fn range(label: &str, min: f64, max: Option<f64>) -> RangeBucket {
    RangeBucket {
        label: label.to_string(),
        min,
        max,
    }
}

fn age_bands(metric: &str) -> Dimension {
    Dimension {
        name: "age_band".to_string(),
        metric: metric.to_string(),
        scheme: BucketScheme::Ranges(vec![
            range("18-24", 18.0, Some(25.0)),
            range("25-34", 25.0, Some(35.0)),
            range("35-44", 35.0, Some(45.0)),
            range("45-54", 45.0, Some(55.0)),
            range("55-64", 55.0, Some(65.0)),
            range("65+", 65.0, None),
        ]),
    }
}

fn income_tiers(metric: &str, low: &[f64], middle: &[f64], high: &[f64]) -> Dimension {
    let tier = |label: &str, c: &[f64]| CodeBucket {
        label: label.to_string(),
        codes: c.to_vec(),
    };
    Dimension {
        name: "income_band".to_string(),
        metric: metric.to_string(),
        scheme: BucketScheme::Codes(vec![
            tier("Low", low),
            tier("Middle", middle),
            tier("High", high),
        ]),
    }
}

fn bmi_categories(metric: &str) -> Dimension {
    Dimension {
        name: "bmi_category".to_string(),
        metric: metric.to_string(),
        scheme: BucketScheme::Ranges(vec![
            range("Underweight", 0.0, Some(18.5)),
            range("Normal", 18.5, Some(25.0)),
            range("Overweight", 25.0, Some(30.0)),
            range("Obese", 30.0, None),
        ]),
    }
}

fn cross_tab(dimension: &str, metric: &str) -> CrossTabSpec {
    CrossTabSpec {
        dimension: dimension.to_string(),
        metric: metric.to_string(),
    }
}

fn technology_labels() -> Vec<(f64, String)> {
    vec![
        (1.0, "Wearable device".to_string()),
        (2.0, "Mobile health app".to_string()),
        (3.0, "Telehealth service".to_string()),
        (4.0, "None".to_string()),
    ]
}

/// Mental health continuum metrics over 14 items: emotional (1-3),
/// social (4-8) and psychological (9-14) wellbeing.
fn wellbeing_metrics(prefix: &str) -> Vec<(String, Metric)> {
    vec![
        metric("emotional_wellbeing", Metric::Composite(items(prefix, 1, 3))),
        metric("social_wellbeing", Metric::Composite(items(prefix, 4, 8))),
        metric(
            "psychological_wellbeing",
            Metric::Composite(items(prefix, 9, 14)),
        ),
        metric("overall_wellbeing", Metric::Composite(items(prefix, 1, 14))),
    ]
}

fn good_health() -> Indicator {
    Indicator {
        name: "good_health".to_string(),
        metric: "general_health".to_string(),
        at_least: 4.0,
    }
}

fn daily_usage() -> Indicator {
    Indicator {
        name: "daily_usage_2h".to_string(),
        metric: "usage_hours".to_string(),
        at_least: 2.0,
    }
}

/// The questionnaire shared by the ASEAN countries.
pub fn asean() -> Instrument {
    let mut fields = vec![
        field("HQ_COUNTRY", FieldKind::Text, true),
        field("A1", FieldKind::Numeric { min: 18.0, max: 110.0 }, true),
        field("A2", FieldKind::Categorical(codes(1..=3)), false),
        field("A4", FieldKind::Categorical(codes(1..=6)), false),
        field("A6", FieldKind::Numeric { min: 0.0, max: 24.0 }, true),
        field("A7", FieldKind::Numeric { min: 20.0, max: 300.0 }, false),
        field("A8", FieldKind::Numeric { min: 100.0, max: 250.0 }, false),
        likert("B3", 1.0, 5.0),
        field("B5", FieldKind::Categorical(codes(1..=4)), false),
    ];
    fields.extend(items("B11", 1, 14).iter().map(|c| likert(c, 0.0, 5.0)));

    let mut metrics = vec![
        metric("age", Metric::Field("A1".to_string())),
        metric("income", Metric::Field("A4".to_string())),
        metric("usage_hours", Metric::Field("A6".to_string())),
        metric("general_health", Metric::Field("B3".to_string())),
        metric(
            "bmi",
            Metric::Bmi {
                weight: "A7".to_string(),
                height_cm: "A8".to_string(),
            },
        ),
    ];
    metrics.extend(wellbeing_metrics("B11"));

    Instrument {
        name: "asean".to_string(),
        description: "Health technology and wellbeing survey, ASEAN countries".to_string(),
        fields,
        metrics,
        country_field: Some("HQ_COUNTRY".to_string()),
        usage_metric: Some("usage_hours".to_string()),
        wellbeing_metric: Some("overall_wellbeing".to_string()),
        distribution_field: Some("B5".to_string()),
        distribution_labels: technology_labels(),
        indicators: vec![good_health(), daily_usage()],
        reported_metrics: vec![
            "general_health".to_string(),
            "emotional_wellbeing".to_string(),
            "social_wellbeing".to_string(),
            "psychological_wellbeing".to_string(),
            "bmi".to_string(),
        ],
        dimensions: vec![
            age_bands("age"),
            income_tiers("income", &[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]),
            bmi_categories("bmi"),
        ],
        cross_tabs: vec![
            cross_tab("age_band", "overall_wellbeing"),
            cross_tab("income_band", "overall_wellbeing"),
            cross_tab("income_band", "usage_hours"),
            cross_tab("bmi_category", "general_health"),
        ],
    }
}

/// The Hong Kong questionnaire, with its own `B9_*` / `B10_*` numbering.
pub fn hong_kong() -> Instrument {
    let mut fields = vec![
        field("A1", FieldKind::Numeric { min: 18.0, max: 110.0 }, true),
        field("A3", FieldKind::Categorical(codes(1..=5)), false),
        likert("B9_1", 1.0, 5.0),
        field("B9_2", FieldKind::Numeric { min: 0.0, max: 24.0 }, true),
        field("B9_3", FieldKind::Categorical(codes(1..=4)), false),
    ];
    fields.extend(items("B10", 1, 14).iter().map(|c| likert(c, 0.0, 5.0)));

    let mut metrics = vec![
        metric("age", Metric::Field("A1".to_string())),
        metric("income", Metric::Field("A3".to_string())),
        metric("general_health", Metric::Field("B9_1".to_string())),
        metric("usage_hours", Metric::Field("B9_2".to_string())),
    ];
    metrics.extend(wellbeing_metrics("B10"));

    Instrument {
        name: "hong_kong".to_string(),
        description: "Health technology and wellbeing survey, Hong Kong".to_string(),
        fields,
        metrics,
        country_field: None,
        usage_metric: Some("usage_hours".to_string()),
        wellbeing_metric: Some("overall_wellbeing".to_string()),
        distribution_field: Some("B9_3".to_string()),
        distribution_labels: technology_labels(),
        indicators: vec![good_health(), daily_usage()],
        reported_metrics: vec![
            "general_health".to_string(),
            "emotional_wellbeing".to_string(),
            "social_wellbeing".to_string(),
            "psychological_wellbeing".to_string(),
        ],
        dimensions: vec![
            age_bands("age"),
            income_tiers("income", &[1.0, 2.0], &[3.0, 4.0], &[5.0]),
        ],
        cross_tabs: vec![
            cross_tab("age_band", "overall_wellbeing"),
            cross_tab("income_band", "overall_wellbeing"),
            cross_tab("age_band", "usage_hours"),
        ],
    }
}

/// Answer codes of the dementia knowledge statements.
pub const ANSWER_TRUE: f64 = 1.0;
pub const ANSWER_FALSE: f64 = 2.0;
pub const ANSWER_DONT_KNOW: f64 = 3.0;

/// Correct answers of the statements `D1` .. `D10`.
pub fn dementia_answer_key() -> AnswerKey {
    let correct = [
        ANSWER_FALSE, // a normal part of ageing
        ANSWER_TRUE,  // Alzheimer's disease is the most common form
        ANSWER_TRUE,  // physical activity helps
        ANSWER_FALSE, // only affects memory
        ANSWER_TRUE,  // high blood pressure is a risk factor
        ANSWER_FALSE, // can be cured with medication
        ANSWER_TRUE,  // personality changes
        ANSWER_FALSE, // only after 80
        ANSWER_TRUE,  // social engagement lowers the risk
        ANSWER_FALSE, // most people with dementia live in care homes
    ];
    AnswerKey {
        items: correct
            .iter()
            .enumerate()
            .map(|(idx, c)| (format!("D{}", idx + 1), *c))
            .collect(),
        dont_know: ANSWER_DONT_KNOW,
    }
}

/// The second Hong Kong questionnaire: AI in dementia care (`C*`) and
/// dementia knowledge (`D*`).
pub fn hong_kong_dementia() -> Instrument {
    let key = dementia_answer_key();
    let mut fields = vec![
        field("A1", FieldKind::Numeric { min: 18.0, max: 110.0 }, true),
        likert("C1", 1.0, 5.0),
        likert("C2", 1.0, 5.0),
        field("C3", FieldKind::Categorical(codes(1..=5)), false),
        field("C4", FieldKind::Numeric { min: 0.0, max: 168.0 }, false),
    ];
    fields.extend(key.items.iter().map(|(code, _)| {
        field(
            code,
            FieldKind::Categorical(vec![ANSWER_TRUE, ANSWER_FALSE, ANSWER_DONT_KNOW]),
            true,
        )
    }));

    Instrument {
        name: "hong_kong_dementia".to_string(),
        description: "AI in dementia care and dementia knowledge, Hong Kong".to_string(),
        fields,
        metrics: vec![
            metric("age", Metric::Field("A1".to_string())),
            metric("ai_familiarity", Metric::Field("C1".to_string())),
            metric("ai_willingness", Metric::Field("C2".to_string())),
            metric("ai_weekly_hours", Metric::Field("C4".to_string())),
            metric("knowledge_score", Metric::Knowledge(key)),
        ],
        country_field: None,
        usage_metric: Some("ai_weekly_hours".to_string()),
        wellbeing_metric: None,
        distribution_field: Some("C3".to_string()),
        distribution_labels: vec![
            (1.0, "Early detection".to_string()),
            (2.0, "Monitoring at home".to_string()),
            (3.0, "Cognitive training".to_string()),
            (4.0, "Caregiver support".to_string()),
            (5.0, "None".to_string()),
        ],
        indicators: vec![
            Indicator {
                name: "willing_to_use_ai".to_string(),
                metric: "ai_willingness".to_string(),
                at_least: 4.0,
            },
            Indicator {
                name: "high_knowledge".to_string(),
                metric: "knowledge_score".to_string(),
                at_least: 75.0,
            },
        ],
        reported_metrics: vec![
            "ai_familiarity".to_string(),
            "ai_willingness".to_string(),
            "knowledge_score".to_string(),
        ],
        dimensions: vec![age_bands("age")],
        cross_tabs: vec![
            cross_tab("age_band", "knowledge_score"),
            cross_tab("age_band", "ai_willingness"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted_knowledge_score;

    #[test]
    fn builtin_instruments_are_consistent() {
        for name in NAMES {
            let instrument = by_name(name).unwrap();
            assert_eq!(instrument.name, *name);
            assert_eq!(instrument.check(), Ok(()));
        }
        assert_eq!(by_name("atlantis"), None);
    }

    #[test]
    fn dementia_key_extremes() {
        let key = dementia_answer_key();
        let mut correct = SurveyRecord::new("correct");
        let mut unsure = SurveyRecord::new("unsure");
        let mut wrong = SurveyRecord::new("wrong");
        for (code, answer) in key.items.iter() {
            correct.insert(code, FieldValue::Number(*answer));
            unsure.insert(code, FieldValue::Number(ANSWER_DONT_KNOW));
            let flipped = if *answer == ANSWER_TRUE {
                ANSWER_FALSE
            } else {
                ANSWER_TRUE
            };
            wrong.insert(code, FieldValue::Number(flipped));
        }
        assert_eq!(weighted_knowledge_score(&correct, &key), Some(100.0));
        assert_eq!(weighted_knowledge_score(&unsure, &key), Some(62.5));
        assert_eq!(weighted_knowledge_score(&wrong, &key), Some(0.0));
    }

    #[test]
    fn subscales_cover_all_items() {
        let instrument = asean();
        let mut total = 0;
        for name in ["emotional_wellbeing", "social_wellbeing", "psychological_wellbeing"] {
            match instrument.metric(name) {
                Some(Metric::Composite(l)) => total += l.len(),
                x => panic!("unexpected metric {:?}", x),
            }
        }
        assert_eq!(total, 14);
    }

    #[test]
    fn income_tiers_group_codes() {
        let dim = asean().dimension("income_band").cloned().unwrap();
        assert_eq!(dim.bucket_for(2.0), Some("Low".to_string()));
        assert_eq!(dim.bucket_for(4.0), Some("Middle".to_string()));
        assert_eq!(dim.bucket_for(6.0), Some("High".to_string()));
        assert_eq!(dim.bucket_for(7.0), None);
    }

    #[test]
    fn country_names() {
        assert_eq!(country_name("TH"), Some("Thailand"));
        assert_eq!(country_name("XX"), None);
    }
}
