//! Reading tests against small XLSX archives assembled in memory.
//!
//! Each test writes the parts it needs with `zip::ZipWriter`, so the fixtures
//! document exactly which XML shapes the reader understands.

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use price_sheets_core::CellValue;
use price_sheets_xlsx::{XlsxError, XlsxReader};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

/// Build an archive with the given sheets (name, sheet XML body) and shared strings.
fn build_workbook(sheets: &[(&str, &str)], shared_strings: Option<&str>) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        let mut workbook_xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        let mut rels_xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (idx, (name, _)) in sheets.iter().enumerate() {
            workbook_xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name,
                idx + 1,
                idx + 1
            ));
            rels_xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="worksheets/sheet{}.xml"/>"#,
                idx + 1,
                WORKSHEET_REL,
                idx + 1
            ));
        }
        workbook_xml.push_str("</sheets></workbook>");
        rels_xml.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook_xml.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(rels_xml.as_bytes()).unwrap();

        if let Some(sst) = shared_strings {
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(sst.as_bytes()).unwrap();
        }

        for (idx, (_, body)) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)
                .unwrap();
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                body
            );
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }
    buf
}

#[test]
fn test_sheet_order_and_names() {
    let bytes = build_workbook(
        &[
            ("Material", ""),
            ("NavarShiarFarsi", ""),
            ("CNC", ""),
            ("Fittings", ""),
        ],
        None,
    );

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    assert_eq!(
        workbook.sheet_names().collect::<Vec<_>>(),
        vec!["Material", "NavarShiarFarsi", "CNC", "Fittings"]
    );
}

#[test]
fn test_shared_strings_and_numbers() {
    let sst = r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3"><si><t>ام دی اف 16 میل - سفید</t></si><si><t>متر مربع</t></si><si><r><t>MDF</t></r><r><rPr><b/></rPr><t>-16</t></r><rPh><t>ignored</t></rPh></si></sst>"#;
    let body = r#"<row r="2"><c r="W2" t="s"><v>0</v></c><c r="X2"><v>2500000</v></c><c r="Y2" t="s"><v>1</v></c></row><row r="3"><c r="W3" t="s"><v>2</v></c><c r="X3" t="n"><v>85000.5</v></c></row>"#;
    let bytes = build_workbook(&[("Material", body)], Some(sst));

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.worksheet_by_name("Material").unwrap();

    assert_eq!(
        sheet.value("W2").unwrap(),
        &CellValue::string("ام دی اف 16 میل - سفید")
    );
    assert_eq!(sheet.value("X2").unwrap(), &CellValue::Number(2500000.0));
    assert_eq!(sheet.value("Y2").unwrap(), &CellValue::string("متر مربع"));
    assert_eq!(sheet.value("W3").unwrap(), &CellValue::string("MDF-16"));
    assert_eq!(sheet.value("X3").unwrap(), &CellValue::Number(85000.5));
    assert_eq!(sheet.value("Y3").unwrap(), &CellValue::Empty);
}

#[test]
fn test_rich_text_runs_keep_their_spacing() {
    let sst = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
  <si>
    <r><t>ام دی اف</t></r>
    <r><rPr><b/></rPr><t xml:space="preserve"> 16 میل</t></r>
  </si>
  <si><t xml:space="preserve">  متر طول </t></si>
</sst>"#;
    let body = r#"<row r="2"><c r="W2" t="s"><v>0</v></c><c r="Y2" t="s"><v>1</v></c></row>
<row r="3"><c r="W3" t="inlineStr"><is><r><t>MDF</t></r><r><t xml:space="preserve"> 16</t></r></is></c></row>"#;
    let bytes = build_workbook(&[("Material", body)], Some(sst));

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.worksheet_by_name("Material").unwrap();

    assert_eq!(sheet.value("W2").unwrap(), &CellValue::string("ام دی اف 16 میل"));
    assert_eq!(sheet.value("Y2").unwrap(), &CellValue::string("  متر طول "));
    assert_eq!(sheet.value("W3").unwrap(), &CellValue::string("MDF 16"));
}

#[test]
fn test_formula_cells_use_cached_values() {
    let body = r#"<row r="1"><c r="A1"><f>B1*2</f><v>300</v></c><c r="B1"><v>150</v></c><c r="C1" t="str"><f>"CNC-"&amp;B1</f><v>CNC-150</v></c><c r="D1"><f>B1/0</f></c><c r="E1" t="e"><f>B1/0</f><v>#DIV/0!</v></c></row>"#;
    let bytes = build_workbook(&[("CNC", body)], None);

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.value("A1").unwrap(), &CellValue::Number(300.0));
    assert_eq!(sheet.value("C1").unwrap(), &CellValue::string("CNC-150"));
    assert_eq!(sheet.value("D1").unwrap(), &CellValue::Empty);
    assert_eq!(
        sheet.value("E1").unwrap(),
        &CellValue::Error("#DIV/0!".to_string())
    );
}

#[test]
fn test_inline_strings_booleans_and_missing_references() {
    let body = r#"<row r="4"><c t="inlineStr"><is><t>All</t></is></c><c t="b"><v>1</v></c><c s="3"/><c><v>12</v></c></row><row><c t="inlineStr"><is><t>next_x000a_line</t></is></c></row>"#;
    let bytes = build_workbook(&[("All", body)], None);

    let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.value("A4").unwrap(), &CellValue::string("All"));
    assert_eq!(sheet.value("B4").unwrap(), &CellValue::Boolean(true));
    assert_eq!(sheet.value("C4").unwrap(), &CellValue::Empty);
    assert_eq!(sheet.value("D4").unwrap(), &CellValue::Number(12.0));
    assert_eq!(sheet.value("A5").unwrap(), &CellValue::string("next\nline"));
}

#[test]
fn test_read_file_from_disk() {
    let body = r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Data</t></is></c></row>"#;
    let bytes = build_workbook(&[("Data", body)], None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pricing.xlsm");
    std::fs::write(&path, bytes).unwrap();

    let workbook = XlsxReader::read_file(&path).unwrap();
    assert_eq!(
        workbook.worksheet_by_name("Data").unwrap().value_at(0, 0),
        &CellValue::string("Data")
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = XlsxReader::read_file(dir.path().join("absent.xlsm"));
    assert!(matches!(result, Err(XlsxError::Io(_))));
}

#[test]
fn test_missing_workbook_part() {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    let result = XlsxReader::read(Cursor::new(buf));
    assert!(matches!(result, Err(XlsxError::MissingPart(part)) if part == "xl/workbook.xml"));
}
