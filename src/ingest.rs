use crate::store::Record;
use std::error::Error;

/// Parse uploaded CSV text into movement records.
///
/// The first line is the header; every following non-empty line becomes one
/// record pairing header columns with field values positionally. Quoted
/// fields with `""` escapes are honored. A short row yields a record with
/// only the columns it has values for; fields beyond the header are dropped.
/// No schema or column-consistency check is applied — the header of each
/// upload stands alone.
///
/// # Arguments
/// * `text` - CSV file contents as UTF-8 text
///
/// # Returns
/// * `Result<Vec<Record>, Box<dyn Error>>` - Parsed records or an error
///
/// # Errors
/// * Returns an error if the input has no header line
pub fn parse_csv(text: &str) -> Result<Vec<Record>, Box<dyn Error>> {
    let mut lines = text.lines().filter(|line| !line.is_empty());

    let header_line = lines.next().ok_or("CSV file is empty")?;
    let header = parse_line(header_line);

    let mut records = Vec::new();
    for line in lines {
        let fields = parse_line(line);
        let record = Record::from_pairs(
            header
                .iter()
                .zip(fields)
                .map(|(column, value)| (column.clone(), value))
                .collect(),
        );
        records.push(record);
    }

    Ok(records)
}

/// Whether an uploaded filename is accepted by the ingester.
///
/// Only the `.csv` suffix is checked; content type and contents are not.
pub fn is_csv_filename(name: &str) -> bool {
    name.ends_with(".csv")
}

// Split one CSV line into fields, honoring double quotes and "" escapes.
fn parse_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if let Some(&next) = chars.peek() {
                    if next == '"' && in_quotes {
                        // Double quote inside quoted field - add a single quote
                        current_field.push('"');
                        chars.next();
                    } else {
                        in_quotes = !in_quotes;
                    }
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    result.push(current_field);
    result
}
