// Reading of the JSON survey exports: one array of flat objects.

use crate::survey::{io_common::record_id, *};

fn read_json_value(v: &JSValue) -> FieldValue {
    match v {
        JSValue::Number(n) => n.as_f64().map_or(FieldValue::Missing, FieldValue::Number),
        JSValue::String(s) if s.trim().is_empty() => FieldValue::Missing,
        JSValue::String(s) => FieldValue::Text(s.trim().to_string()),
        JSValue::Bool(b) => FieldValue::Number(if *b { 1.0 } else { 0.0 }),
        JSValue::Null => FieldValue::Missing,
        JSValue::Array(_) | JSValue::Object(_) => {
            debug!("read_json_value: nested value treated as missing: {:?}", v);
            FieldValue::Missing
        }
    }
}

pub fn parse_json_records(js: &JSValue, path: &str, cfs: &FileSource) -> SResult<Vec<ParsedRecord>> {
    let rows = js.as_array().context(JsonNotArraySnafu { path })?;
    let mut res: Vec<ParsedRecord> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let obj = row.as_object().context(JsonNotObjectSnafu {
            path,
            lineno: idx + 1,
        })?;
        let fields: Vec<(String, FieldValue)> = obj
            .iter()
            .map(|(k, v)| (k.clone(), read_json_value(v)))
            .collect();
        debug!("parse_json_records: idx: {:?} fields: {:?}", idx, fields);
        res.push(ParsedRecord {
            id: record_id(&fields, &cfs.id_field),
            fields,
        });
    }
    Ok(res)
}

pub fn read_json_records(path: &str, cfs: &FileSource) -> SResult<Vec<ParsedRecord>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    parse_json_records(&js, path, cfs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values() {
        let js = json!([
            {"ID": "TH-1", "HQ_COUNTRY": "TH", "B3": 4, "A7": null, "A8": "", "flag": true},
            {"B3": 2.5, "extra": [1, 2]}
        ]);
        let mut cfs = FileSource::new("json", "a.json", "asean");
        cfs.id_field = Some("ID".to_string());
        let res = parse_json_records(&js, "a.json", &cfs).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].id, Some("TH-1".to_string()));
        assert_eq!(res[1].id, None);
        let get = |r: &ParsedRecord, code: &str| {
            r.fields
                .iter()
                .find(|(c, _)| c == code)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get(&res[0], "B3"), Some(FieldValue::Number(4.0)));
        assert_eq!(get(&res[0], "A7"), Some(FieldValue::Missing));
        assert_eq!(get(&res[0], "A8"), Some(FieldValue::Missing));
        assert_eq!(get(&res[0], "flag"), Some(FieldValue::Number(1.0)));
        assert_eq!(get(&res[0], "HQ_COUNTRY"), Some(FieldValue::Text("TH".to_string())));
        assert_eq!(get(&res[1], "extra"), Some(FieldValue::Missing));
    }

    #[test]
    fn json_not_an_array() {
        let cfs = FileSource::new("json", "a.json", "asean");
        let res = parse_json_records(&json!({"B3": 1}), "a.json", &cfs);
        assert!(matches!(res, Err(SurveyError::JsonNotArray { .. })));
        let res = parse_json_records(&json!([1, 2]), "a.json", &cfs);
        assert!(matches!(res, Err(SurveyError::JsonNotObject { lineno: 1, .. })));
    }
}
