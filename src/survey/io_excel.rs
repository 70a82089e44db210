// Reading of Excel (.xlsx) survey exports.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::survey::{
    io_common::{parse_cell, record_id},
    *,
};

fn read_cell(cell: &DataType) -> FieldValue {
    match cell {
        DataType::Float(f) => FieldValue::Number(*f),
        DataType::Int(i) => FieldValue::Number(*i as f64),
        DataType::Bool(b) => FieldValue::Number(if *b { 1.0 } else { 0.0 }),
        DataType::String(s) => parse_cell(s),
        DataType::Empty => FieldValue::Missing,
        _ => {
            debug!("read_cell: cell treated as missing: {:?}", cell);
            FieldValue::Missing
        }
    }
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Float(f) => code_label(*f),
        DataType::Int(i) => i.to_string(),
        _ => "".to_string(),
    }
}

/// Converts the rows of a worksheet, the first row holding the field codes.
fn read_rows(wrange: &calamine::Range<DataType>, cfs: &FileSource) -> Vec<ParsedRecord> {
    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(h) => h.iter().map(header_name).collect(),
        None => return Vec::new(),
    };
    debug!("read_rows: header: {:?}", header);

    let mut res: Vec<ParsedRecord> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let fields: Vec<(String, FieldValue)> = header
            .iter()
            .zip(row.iter())
            // Columns without a name are not part of the survey.
            .filter(|(code, _)| !code.is_empty())
            .map(|(code, cell)| (code.clone(), read_cell(cell)))
            .collect();
        if fields.iter().all(|(_, v)| v.is_missing()) {
            debug!("read_rows: skipping empty row {:?}", idx + 2);
            continue;
        }
        res.push(ParsedRecord {
            id: record_id(&fields, &cfs.id_field),
            fields,
        });
    }
    res
}

/// Checks that the workbook has a worksheet with the given name.
fn check_worksheet_name(sheet_names: &[String], path: &str, worksheet_name: &str) -> SResult<()> {
    ensure!(
        sheet_names.iter().any(|n| n == worksheet_name),
        MissingWorksheetSnafu {
            path,
            worksheet: worksheet_name,
        }
    );
    Ok(())
}

/// Without a worksheet name, the workbook must have exactly one worksheet.
fn single_worksheet(
    worksheets: Vec<(String, calamine::Range<DataType>)>,
    path: &str,
) -> SResult<calamine::Range<DataType>> {
    match worksheets.as_slice() {
        [] => EmptyExcelSnafu { path }.fail(),
        [(worksheet_name, wrange)] => {
            debug!("single_worksheet: path: {:?} worksheet: {:?}", path, worksheet_name);
            Ok(wrange.clone())
        }
        _ => AmbiguousWorksheetSnafu { path }.fail(),
    }
}

fn get_range(path: &str, cfs: &FileSource) -> SResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = &cfs.excel_worksheet_name {
        check_worksheet_name(workbook.sheet_names(), path, worksheet_name)?;
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: worksheet_name.as_str(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        single_worksheet(workbook.worksheets(), path)
    }
}

pub fn read_excel_records(path: &str, cfs: &FileSource) -> SResult<Vec<ParsedRecord>> {
    let wrange = get_range(path, cfs)?;
    Ok(read_rows(&wrange, cfs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Int(3)), FieldValue::Number(3.0));
        assert_eq!(read_cell(&DataType::Float(1.5)), FieldValue::Number(1.5));
        assert_eq!(
            read_cell(&DataType::String("4".to_string())),
            FieldValue::Number(4.0)
        );
        assert_eq!(
            read_cell(&DataType::String("SG".to_string())),
            FieldValue::Text("SG".to_string())
        );
        assert_eq!(read_cell(&DataType::Empty), FieldValue::Missing);
    }

    fn sheet(name: &str) -> (String, calamine::Range<DataType>) {
        let mut range: calamine::Range<DataType> = calamine::Range::new((0, 0), (0, 0));
        range.set_value((0, 0), DataType::String(name.to_string()));
        (name.to_string(), range)
    }

    fn first_cell(range: &calamine::Range<DataType>) -> Option<DataType> {
        range.rows().next().map(|r| r[0].clone())
    }

    #[test]
    fn worksheet_selection() {
        let res = single_worksheet(vec![sheet("SG")], "sg.xlsx").unwrap();
        assert_eq!(first_cell(&res), Some(DataType::String("SG".to_string())));
        assert!(matches!(
            single_worksheet(vec![sheet("SG"), sheet("MY")], "a.xlsx"),
            Err(SurveyError::AmbiguousWorksheet { .. })
        ));
        assert!(matches!(
            single_worksheet(Vec::new(), "a.xlsx"),
            Err(SurveyError::EmptyExcel { .. })
        ));
    }

    #[test]
    fn unknown_worksheet_is_named() {
        let names = vec!["SG".to_string(), "MY".to_string()];
        assert!(check_worksheet_name(&names, "a.xlsx", "MY").is_ok());
        let res = check_worksheet_name(&names, "a.xlsx", "TH");
        match &res {
            Err(SurveyError::MissingWorksheet { worksheet, .. }) => assert_eq!(worksheet, "TH"),
            x => panic!("unexpected result {:?}", x),
        }
        assert_eq!(
            res.unwrap_err().to_string(),
            "The spreadsheet a.xlsx has no worksheet named TH"
        );
    }

    #[test]
    fn rows() {
        let mut range: calamine::Range<DataType> = calamine::Range::new((0, 0), (3, 2));
        range.set_value((0, 0), DataType::String("ID".to_string()));
        range.set_value((0, 1), DataType::String("B3".to_string()));
        range.set_value((1, 0), DataType::String("sg-1".to_string()));
        range.set_value((1, 1), DataType::Float(4.0));
        // Row 2 stays empty.
        range.set_value((3, 0), DataType::String("sg-2".to_string()));
        range.set_value((3, 1), DataType::Int(2));
        let mut cfs = FileSource::new("xlsx", "sg.xlsx", "asean");
        cfs.id_field = Some("ID".to_string());
        let res = read_rows(&range, &cfs);
        assert_eq!(res.len(), 2);
        assert_eq!(res[1].id, Some("sg-2".to_string()));
        assert_eq!(res[1].fields[1], ("B3".to_string(), FieldValue::Number(2.0)));
    }
}
