//! Local Upload-Stage Parsing
//!
//! Only the header line is parsed for validation; the full file is the
//! backend's job. Rows are still read into memory so the session repair
//! procedure can re-serialize them when a session identifier is lost.

use serde_json::Value;

use crate::types::{ForecastError, Result, Row};

/// Parse the header row of a CSV document.
///
/// Rejects empty input and all-blank header rows locally, before any
/// network call is made.
pub fn read_headers(text: &str) -> Result<Vec<String>> {
    let first_line = text
        .trim_start_matches('\u{feff}')
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ForecastError::input("file is empty"))?;

    let headers: Vec<String> = split_line(first_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ForecastError::input("header row is blank"));
    }

    Ok(headers)
}

/// Read the data rows following the header, keyed by column name.
///
/// Tolerant by design: blank lines are skipped and short rows are padded
/// with empty strings. Field text is kept verbatim so a repair re-upload
/// serializes exactly what the original file carried (a zero-padded id
/// like "007" must not come back as `7`).
pub fn parse_rows(text: &str, headers: &[String]) -> Vec<Row> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .map(|line| {
            let fields = split_line(line);
            let mut row = Row::new();
            for (i, header) in headers.iter().enumerate() {
                let raw = fields.get(i).map(String::as_str).unwrap_or("");
                row.insert(header.clone(), Value::from(raw.trim()));
            }
            row
        })
        .collect()
}

/// Bounded display sample with numeric-looking values coerced to JSON
/// numbers, so the preview renders the way the service will see them.
/// Display only; the retained rows stay verbatim.
pub fn typed_preview(rows: &[Row], limit: usize) -> Vec<Row> {
    rows.iter()
        .take(limit)
        .map(|row| {
            row.iter()
                .map(|(key, value)| match value {
                    Value::String(s) => (key.clone(), parse_value(s)),
                    other => (key.clone(), other.clone()),
                })
                .collect()
        })
        .collect()
}

/// Re-serialize in-memory rows to a CSV payload for repair re-upload
pub fn rows_to_csv(headers: &[String], rows: &[Row]) -> String {
    let mut out = String::new();
    out.push_str(
        &headers
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');

    for row in rows {
        let line = headers
            .iter()
            .map(|h| escape_field(&field_to_string(row.get(h))))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Split one CSV line, honoring double-quoted fields
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    Value::from(trimmed)
}

fn field_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_read_headers() {
        let headers = read_headers("date,sales\n2024-01-01,10\n").unwrap();
        assert_eq!(headers, vec!["date", "sales"]);
    }

    #[test]
    fn test_read_headers_rejects_empty_input() {
        assert!(read_headers("").is_err());
        assert!(read_headers("\n\n  \n").is_err());
        assert!(read_headers(",,\n1,2,3\n").is_err());
    }

    #[test]
    fn test_read_headers_strips_bom() {
        let headers = read_headers("\u{feff}date,sales\n").unwrap();
        assert_eq!(headers[0], "date");
    }

    #[test]
    fn test_quoted_fields() {
        let headers = read_headers("\"region, area\",sales\n").unwrap();
        assert_eq!(headers, vec!["region, area", "sales"]);
    }

    #[test]
    fn test_parse_rows_keeps_text_and_pads() {
        let headers = read_headers("date,sales,note\n").unwrap();
        let rows = parse_rows(
            "date,sales,note\n2024-01-01,10,launch\n2024-01-02,12.5\n",
            &headers,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["sales"], "10");
        assert_eq!(rows[1]["sales"], "12.5");
        assert_eq!(rows[1]["note"], "");
    }

    #[test]
    fn test_typed_preview_coerces_numerics() {
        let headers = read_headers("date,sales\n").unwrap();
        let rows = parse_rows("date,sales\n2024-01-01,10\n2024-01-02,12.5\n", &headers);

        let preview = typed_preview(&rows, 1);
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0]["sales"], 10);
        assert_eq!(preview[0]["date"], "2024-01-01");
        // source rows stay verbatim
        assert_eq!(rows[0]["sales"], "10");
    }

    #[test]
    fn test_string_like_numerics_survive_reserialization() {
        let text = "id,sales\n007,10\n0.50,3\n";
        let headers = read_headers(text).unwrap();
        let rows = parse_rows(text, &headers);
        assert_eq!(rows[0]["id"], "007");

        let rebuilt = rows_to_csv(&headers, &rows);
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_rows_to_csv_round_trip() {
        let text = "date,sales\n2024-01-01,10\n2024-01-02,12\n";
        let headers = read_headers(text).unwrap();
        let rows = parse_rows(text, &headers);
        let rebuilt = rows_to_csv(&headers, &rows);

        let reparsed = parse_rows(&rebuilt, &read_headers(&rebuilt).unwrap());
        assert_eq!(rows, reparsed);
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    proptest! {
        /// Any simple alphanumeric header row survives a serialize/parse cycle
        #[test]
        fn prop_header_round_trip(names in proptest::collection::vec("[a-zA-Z][a-zA-Z0-9_]{0,12}", 1..6)) {
            let line = names.join(",");
            let parsed = read_headers(&format!("{}\n", line)).unwrap();
            prop_assert_eq!(parsed, names);
        }
    }
}
