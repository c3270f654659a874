//! Flat-format export of result sets
//!
//! CSV and JSON writers over an arbitrary `io::Write` sink. The caller owns
//! file naming, dialogs, and anything else around the actual bytes.

use std::io::Write;

use serde_json::Value;

use crate::result::ResultSet;
use crate::EngineError;

/// Write the result set as CSV: header row in column order, missing cells
/// empty, scalar values in their natural string form.
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<(), EngineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&results.columns)?;

    for row in &results.rows {
        let record: Vec<String> = results
            .columns
            .iter()
            .map(|column| match row.get(column) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the result set as a pretty-printed JSON array of row objects.
pub fn write_json<W: Write>(results: &ResultSet, writer: W) -> Result<(), EngineError> {
    serde_json::to_writer_pretty(writer, &results.rows)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Row;
    use serde_json::json;

    fn sample() -> ResultSet {
        let mut first = Row::new();
        first.insert("Level".to_string(), json!("Error"));
        first.insert("Count".to_string(), json!(5));
        let mut second = Row::new();
        second.insert("Level".to_string(), json!("Warning"));
        // Count intentionally missing from the second row
        ResultSet::new(
            vec!["Level".to_string(), "Count".to_string()],
            vec![first, second],
        )
    }

    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        write_csv(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Level,Count\nError,5\nWarning,\n");
    }

    #[test]
    fn test_json_export_round_trips() {
        let mut out = Vec::new();
        write_json(&sample(), &mut out).unwrap();
        let parsed: Vec<Row> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["Count"], json!(5));
    }
}
