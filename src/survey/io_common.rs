use std::path::Path;

use survey_metrics::FieldValue;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Identifiers for the records that do not carry one: the file name and the line number.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Interprets the content of a text cell.
///
/// Blank cells are missing answers, cells holding a number are numeric answers.
pub fn parse_cell(s: &str) -> FieldValue {
    let t = s.trim();
    if t.is_empty() {
        FieldValue::Missing
    } else if let Ok(x) = t.parse::<f64>() {
        FieldValue::Number(x)
    } else {
        FieldValue::Text(t.to_string())
    }
}

/// The identifier of a record, read from the id field if configured.
pub fn record_id(fields: &[(String, FieldValue)], id_field: &Option<String>) -> Option<String> {
    let id_field = id_field.as_ref()?;
    fields
        .iter()
        .find(|(code, _)| code == id_field)
        .and_then(|(_, v)| v.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(parse_cell(""), FieldValue::Missing);
        assert_eq!(parse_cell("  "), FieldValue::Missing);
        assert_eq!(parse_cell(" 4 "), FieldValue::Number(4.0));
        assert_eq!(parse_cell("1.5"), FieldValue::Number(1.5));
        assert_eq!(parse_cell("TH"), FieldValue::Text("TH".to_string()));
    }

    #[test]
    fn default_ids() {
        let f = make_default_id("/data/surveys/asean.json");
        assert_eq!(f(12), "asean.json-00000012");
    }

    #[test]
    fn ids_from_field() {
        let fields = vec![
            ("ID".to_string(), FieldValue::Number(17.0)),
            ("B3".to_string(), FieldValue::Number(4.0)),
        ];
        assert_eq!(record_id(&fields, &Some("ID".to_string())), Some("17".to_string()));
        assert_eq!(record_id(&fields, &Some("X".to_string())), None);
        assert_eq!(record_id(&fields, &None), None);
    }
}
