// Primitives for reading CSV files.

use crate::survey::{
    io_common::{parse_cell, record_id},
    *,
};

/// Reads respondents from a CSV file whose first row holds the field codes.
pub fn read_csv_records(path: &str, cfs: &FileSource) -> SResult<Vec<ParsedRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_csv(rdr, path, cfs)
}

fn read_csv<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    path: &str,
    cfs: &FileSource,
) -> SResult<Vec<ParsedRecord>> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvHeaderSnafu { path })?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    debug!("read_csv: header: {:?}", header);

    let mut res: Vec<ParsedRecord> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        // Short lines leave the last fields unanswered.
        let fields: Vec<(String, FieldValue)> = header
            .iter()
            .enumerate()
            .map(|(col, code)| {
                (
                    code.clone(),
                    line.get(col).map_or(FieldValue::Missing, parse_cell),
                )
            })
            .collect();
        debug!("read_csv: lineno: {:?} fields: {:?}", lineno, fields);
        res.push(ParsedRecord {
            id: record_id(&fields, &cfs.id_field),
            fields,
        });
    }
    Ok(res)
}
