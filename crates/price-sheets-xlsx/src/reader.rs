//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use price_sheets_core::{CellAddress, CellValue, Workbook, Worksheet};

const CONTENT_TYPES: &str = "[Content_Types].xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Replace `_xHHHH_` escapes (how spreadsheets store control characters
/// such as line breaks) with the character they name
///
/// Anything that does not form a complete escape is kept as written.
fn decode_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("_x") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &candidate[7..];
            }
            None => {
                out.push('_');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Unescaped value of one attribute
fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Text is kept untrimmed: spaces at run edges belong to the cell value
fn xml_reader(bytes: &[u8]) -> Reader<&[u8]> {
    Reader::from_reader(bytes)
}

/// Cell being assembled while its element is open
#[derive(Default)]
struct PendingCell {
    address: Option<CellAddress>,
    cell_type: Option<String>,
    value: Option<String>,
}

/// XLSX / XLSM file reader (values only)
///
/// Formulas are never evaluated; a formula cell holds whatever result the
/// workbook cached the last time it was saved.
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    ///
    /// The file is closed before this returns.
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from any seekable byte source
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = ZipArchive::new(reader)?;

        if archive.by_name(CONTENT_TYPES).is_err() {
            return Err(XlsxError::InvalidFormat(format!("no {} part", CONTENT_TYPES)));
        }

        let shared_strings = match Self::part(&mut archive, SHARED_STRINGS)? {
            Some(bytes) => Self::shared_strings(&bytes)?,
            None => Vec::new(),
        };
        let sheets = Self::sheet_entries(&Self::required_part(&mut archive, WORKBOOK_PART)?)?;
        let targets = Self::worksheet_targets(&Self::required_part(&mut archive, WORKBOOK_RELS)?)?;

        let mut workbook = Workbook::empty();
        for (name, rel_id) in sheets {
            let Some(target) = targets.get(&rel_id) else {
                log::warn!("sheet '{}' points at unknown relationship {}, skipping", name, rel_id);
                continue;
            };

            let bytes = Self::required_part(&mut archive, target)?;
            let mut worksheet = Worksheet::new(name.as_str());
            Self::fill_worksheet(&bytes, &mut worksheet, &shared_strings)?;
            log::debug!(
                "sheet '{}' ({}): {} cells",
                name,
                target,
                worksheet.cell_count()
            );
            workbook.add_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Bytes of an archive part, `None` when the archive lacks it
    fn part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> XlsxResult<Option<Vec<u8>>> {
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    fn required_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> XlsxResult<Vec<u8>> {
        Self::part(archive, path)?.ok_or_else(|| XlsxError::MissingPart(path.to_string()))
    }

    /// Shared string table; rich-text runs are joined, phonetic hints dropped
    fn shared_strings(bytes: &[u8]) -> XlsxResult<Vec<String>> {
        let mut reader = xml_reader(bytes);
        let mut buf = Vec::new();
        let mut strings = Vec::new();
        let mut current = String::new();
        let (mut in_item, mut in_text, mut in_phonetic) = (false, false, false);

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        in_item = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" => in_text = in_item && !in_phonetic,
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_escapes(&current));
                        in_item = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Event::Text(e) if in_text => current.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// `(name, relationship id)` for every sheet, in tab order
    fn sheet_entries(bytes: &[u8]) -> XlsxResult<Vec<(String, String)>> {
        let mut reader = xml_reader(bytes);
        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                    match (attribute(&e, b"name"), attribute(&e, b"r:id")) {
                        (Some(name), Some(rel_id)) => sheets.push((name, rel_id)),
                        _ => log::warn!("sheet entry without name or relationship, skipping"),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Relationship id -> archive path, for worksheet relationships only
    fn worksheet_targets(bytes: &[u8]) -> XlsxResult<HashMap<String, String>> {
        let mut reader = xml_reader(bytes);
        let mut buf = Vec::new();
        let mut targets = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    let is_worksheet = attribute(&e, b"Type")
                        .is_some_and(|kind| kind.ends_with("/worksheet"));
                    if let (true, Some(id), Some(target)) =
                        (is_worksheet, attribute(&e, b"Id"), attribute(&e, b"Target"))
                    {
                        // relative targets hang off xl/
                        let path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        targets.insert(id, path);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(targets)
    }

    /// Copy every valued cell of one worksheet part into `worksheet`
    fn fill_worksheet(
        bytes: &[u8],
        worksheet: &mut Worksheet,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let mut reader = xml_reader(bytes);
        let mut buf = Vec::new();

        // where the next cell lands when `r` attributes are omitted
        let mut row: u32 = 0;
        let mut next_col: u16 = 0;

        let mut pending: Option<PendingCell> = None;
        let (mut in_value, mut in_inline, mut in_inline_text) = (false, false, false);

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => {
                        row = Self::row_index(&e).unwrap_or(row);
                        next_col = 0;
                    }
                    b"c" => {
                        let cell = Self::open_cell(&e, row, next_col)?;
                        next_col = cell.address.map_or(next_col, |a| a.col.saturating_add(1));
                        pending = Some(cell);
                    }
                    b"v" => in_value = pending.is_some(),
                    b"is" => in_inline = pending.is_some(),
                    b"t" => in_inline_text = in_inline,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" => {
                        row = Self::row_index(&e).map_or(row + 1, |r| r + 1);
                        next_col = 0;
                    }
                    b"c" => {
                        // styled cell without a value still takes a position
                        let cell = Self::open_cell(&e, row, next_col)?;
                        next_col = cell.address.map_or(next_col, |a| a.col.saturating_add(1));
                    }
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"row" => {
                        row += 1;
                        next_col = 0;
                    }
                    b"c" => {
                        if let Some(cell) = pending.take() {
                            Self::store_cell(worksheet, cell, shared_strings)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Event::Text(e) if in_value || in_inline_text => {
                    let text = e.unescape()?;
                    if let Some(cell) = pending.as_mut() {
                        cell.value.get_or_insert_with(String::new).push_str(&text);
                        if in_inline_text {
                            cell.cell_type = Some("inlineStr".to_string());
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// 0-based row index from `<row r="..">`
    fn row_index(e: &BytesStart) -> Option<u32> {
        attribute(e, b"r")?.parse::<u32>().ok().map(|r| r.saturating_sub(1))
    }

    fn open_cell(e: &BytesStart, row: u32, next_col: u16) -> XlsxResult<PendingCell> {
        let address = match attribute(e, b"r") {
            Some(reference) => CellAddress::parse(&reference)
                .map_err(|err| XlsxError::Parse(format!("cell reference '{}': {}", reference, err)))?,
            None => CellAddress::new(row, next_col),
        };

        Ok(PendingCell {
            address: Some(address),
            cell_type: attribute(e, b"t"),
            value: None,
        })
    }

    fn store_cell(
        worksheet: &mut Worksheet,
        cell: PendingCell,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let (Some(addr), Some(raw)) = (cell.address, cell.value) else {
            return Ok(());
        };

        let value = match cell.cell_type.as_deref() {
            Some("s") => {
                let text = raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| shared_strings.get(idx))
                    .ok_or_else(|| {
                        XlsxError::Parse(format!("{} has no shared string '{}'", addr, raw))
                    })?;
                CellValue::String(text.clone())
            }
            Some("b") => {
                let raw = raw.trim();
                CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true"))
            }
            Some("e") => CellValue::Error(raw.trim().to_string()),
            Some("inlineStr") | Some("str") => CellValue::String(decode_escapes(&raw)),
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(raw),
            },
            // ISO dates ("d") and unknown types stay as text
            Some(_) => CellValue::String(raw),
        };

        worksheet.set_value_at(addr.row, addr.col, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_line_breaks() {
        assert_eq!(decode_escapes("برش_x000d__x000a_لبه"), "برش\r\nلبه");
        assert_eq!(decode_escapes("tab_x0009_"), "tab\t");
    }

    #[test]
    fn test_decode_escaped_underscore() {
        assert_eq!(decode_escapes("MDF_x005f_16"), "MDF_16");
    }

    #[test]
    fn test_plain_underscores_survive() {
        assert_eq!(decode_escapes("PVC_16_white"), "PVC_16_white");
        assert_eq!(decode_escapes("ام دی اف_سفید"), "ام دی اف_سفید");
        assert_eq!(decode_escapes("_x"), "_x");
        assert_eq!(decode_escapes("_x00"), "_x00");
        assert_eq!(decode_escapes("_x000d"), "_x000d");
        assert_eq!(decode_escapes("_x00zz_"), "_x00zz_");
        assert_eq!(decode_escapes("__x000a_"), "_\n");
    }

    fn archive(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            for (name, body) in parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    const TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;

    #[test]
    fn test_sheet_without_relationship_is_skipped() {
        let bytes = archive(&[
            (CONTENT_TYPES, TYPES),
            (
                WORKBOOK_PART,
                r#"<workbook xmlns:r="r"><sheets><sheet name="CNC" r:id="rId1"/><sheet name="Ghost" r:id="rId9"/></sheets></workbook>"#,
            ),
            (
                WORKBOOK_RELS,
                r#"<Relationships><Relationship Id="rId1" Type="x/worksheet" Target="/xl/worksheets/cnc.xml"/><Relationship Id="rId2" Type="x/styles" Target="styles.xml"/></Relationships>"#,
            ),
            (
                "xl/worksheets/cnc.xml",
                r#"<worksheet><sheetData><row r="2"><c r="W2" t="inlineStr"><is><t>برش</t></is></c><c r="X2"><v>150000</v></c></row></sheetData></worksheet>"#,
            ),
        ]);

        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["CNC"]);
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.value_at(1, 22), &CellValue::string("برش"));
        assert_eq!(sheet.value_at(1, 23), &CellValue::Number(150000.0));
    }

    #[test]
    fn test_bad_shared_string_index() {
        let bytes = archive(&[
            (CONTENT_TYPES, TYPES),
            (WORKBOOK_PART, r#"<workbook xmlns:r="r"><sheets><sheet name="Material" r:id="rId1"/></sheets></workbook>"#),
            (WORKBOOK_RELS, r#"<Relationships><Relationship Id="rId1" Type="x/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#),
            (SHARED_STRINGS, r#"<sst><si><t>MDF</t></si></sst>"#),
            ("xl/worksheets/sheet1.xml", r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>4</v></c></row></sheetData></worksheet>"#),
        ]);

        let result = XlsxReader::read(Cursor::new(bytes));
        assert!(matches!(result, Err(XlsxError::Parse(msg)) if msg.contains("A1")));
    }

    #[test]
    fn test_missing_content_types() {
        let bytes = archive(&[(WORKBOOK_PART, "<workbook/>")]);
        let result = XlsxReader::read(Cursor::new(bytes));
        assert!(matches!(result, Err(XlsxError::InvalidFormat(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let result = XlsxReader::read(Cursor::new(b"not a workbook".to_vec()));
        assert!(matches!(result, Err(XlsxError::Zip(_))));
    }
}
