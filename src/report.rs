use crate::store::{MovementStore, Record};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::error::Error;

// A4 page geometry and line layout for the PDF report, in millimeters.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP_Y: f32 = 280.0;
const BOTTOM_MARGIN: f32 = 20.0;
const LINE_STEP: f32 = 7.0;

/// Convert the movement store to an Excel workbook.
///
/// The header row is the column set of the first record; each record is
/// appended in insertion order, its values written positionally by its own
/// column order. The workbook is produced entirely in memory.
///
/// # Arguments
/// * `store` - The movement store to export
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
pub fn to_xlsx(store: &MovementStore) -> Result<Vec<u8>, Box<dyn Error>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, name) in store.header().iter().enumerate() {
        worksheet.write_string(0, c as u16, name.as_str())?;
    }

    for (r, record) in store.records().iter().enumerate() {
        for (c, (_, value)) in record.iter().enumerate() {
            worksheet.write_string((r + 1) as u32, c as u16, value)?;
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

/// Convert the movement store to a paginated PDF report.
///
/// One text line per record, descending a fixed step per line; a new A4 page
/// starts whenever the cursor drops below the bottom margin. No structured
/// layout or aggregation.
///
/// # Arguments
/// * `store` - The movement store to export
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - PDF file content as bytes or an error
pub fn to_pdf(store: &MovementStore) -> Result<Vec<u8>, Box<dyn Error>> {
    let (doc, page, layer) = PdfDocument::new(
        "Waste Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let mut current_layer = doc.get_page(page).get_layer(layer);
    current_layer.use_text("Waste Report PDF", 14.0, Mm(30.0), Mm(TOP_Y), &font);

    let mut y = TOP_Y - 2.0 * LINE_STEP;
    for record in store.records() {
        if y < BOTTOM_MARGIN {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current_layer = doc.get_page(next_page).get_layer(next_layer);
            y = TOP_Y;
        }

        current_layer.use_text(record_line(record), 10.0, Mm(15.0), Mm(y), &font);
        y -= LINE_STEP;
    }

    let bytes = doc.save_to_bytes()?;

    Ok(bytes)
}

/// Format one record as a single report line: `{"col": "value", ...}`.
pub fn record_line(record: &Record) -> String {
    let mut line = String::from("{");
    for (i, (column, value)) in record.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        line.push_str(&format!("\"{}\": \"{}\"", column, value));
    }
    line.push('}');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MovementStore;

    fn store_with(rows: &[&[(&str, &str)]]) -> MovementStore {
        let mut store = MovementStore::new();
        store.append(
            rows.iter()
                .map(|pairs| {
                    Record::from_pairs(
                        pairs
                            .iter()
                            .map(|(c, v)| (c.to_string(), v.to_string()))
                            .collect(),
                    )
                })
                .collect(),
        );
        store
    }

    #[test]
    fn record_line_is_braced_pairs() {
        let store = store_with(&[&[("type", "plastic"), ("weight", "10")]]);
        assert_eq!(
            record_line(&store.records()[0]),
            r#"{"type": "plastic", "weight": "10"}"#
        );
    }

    #[test]
    fn xlsx_bytes_are_a_zip_container() {
        let store = store_with(&[
            &[("type", "plastic"), ("weight", "10")],
            &[("type", "glass"), ("weight", "4")],
        ]);
        let bytes = to_xlsx(&store).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_store_still_exports() {
        let store = MovementStore::new();
        assert_eq!(&to_xlsx(&store).unwrap()[..2], b"PK");
        assert!(to_pdf(&store).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_bytes_carry_the_magic_header() {
        let store = store_with(&[&[("type", "plastic")]]);
        let bytes = to_pdf(&store).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_reports_paginate() {
        let rows: Vec<Vec<(String, String)>> = (0..120)
            .map(|i| vec![("type".to_string(), format!("batch-{}", i))])
            .collect();
        let mut store = MovementStore::new();
        store.append(rows.into_iter().map(Record::from_pairs).collect());

        let long = to_pdf(&store).unwrap();
        let short = to_pdf(&store_with(&[&[("type", "plastic")]])).unwrap();
        assert!(long.len() > short.len());
    }
}
