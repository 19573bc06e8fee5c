//! Export projector - renames curated columns and serializes rows to JSON or CSV

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{ExplorerError, Result};
use crate::schema::{Column, Row};

/// Supported download formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    /// Accepted on input, rejected by [`serialize`]
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ExplorerError::Export(format!("Invalid export format: {}", s))),
        }
    }
}

/// A serialized export ready to be handed to an [`ExportSink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub content: String,
    pub mime_type: String,
    pub file_name: String,
}

/// Remaps each row to the columns' friendly names, in column order.
/// Keys missing from a row are omitted rather than filled with null.
pub fn project(rows: &[Row], columns: &[Column]) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            let mut projected = Map::new();
            for column in columns {
                if let Some(value) = row.get(&column.key) {
                    projected.insert(column.friendly_name.clone(), value.clone());
                }
            }
            projected
        })
        .collect()
}

/// Serializes projected rows. `columns` supplies the CSV header and cell order.
pub fn serialize(projected: &[Row], columns: &[Column], format: ExportFormat) -> Result<ExportFile> {
    let content = match format {
        ExportFormat::Json => {
            let rows: Vec<Value> = projected.iter().cloned().map(Value::Object).collect();
            serde_json::to_string_pretty(&rows).map_err(|e| ExplorerError::Export(e.to_string()))?
        }
        ExportFormat::Csv => to_csv(projected, columns),
        ExportFormat::Pdf => {
            return Err(ExplorerError::Export(
                "PDF export is not implemented yet.".to_string(),
            ))
        }
    };

    let mime_type = match format {
        ExportFormat::Json => "application/json",
        _ => "text/csv;charset=utf-8;",
    };

    Ok(ExportFile {
        content,
        mime_type: mime_type.to_string(),
        file_name: report_file_name(format),
    })
}

fn report_file_name(format: ExportFormat) -> String {
    format!(
        "report-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        format.extension()
    )
}

fn to_csv(projected: &[Row], columns: &[Column]) -> String {
    let header = columns
        .iter()
        .map(|c| quote(&c.friendly_name))
        .collect::<Vec<_>>()
        .join(",");

    let rows = projected
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| csv_cell(row.get(&c.friendly_name)))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\r\n");

    format!("{}\r\n{}", header, rows)
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => quote(s),
        Some(other) => quote(&other.to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Delivers an export to the user
pub trait ExportSink: Send {
    fn deliver(&self, file: &ExportFile) -> anyhow::Result<PathBuf>;
}

/// Writes exports into a directory
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }
}

impl ExportSink for DirectorySink {
    fn deliver(&self, file: &ExportFile) -> anyhow::Result<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(&file.file_name);
        fs::write(&path, &file.content)?;
        tracing::info!(path = %path.display(), mime = %file.mime_type, "Export written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(key: &str, name: &str, order: usize) -> Column {
        Column {
            key: key.to_string(),
            friendly_name: name.to_string(),
            visible: true,
            order,
        }
    }

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    /// Minimal RFC 4180 reader for checking our own output
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        let mut record = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => record.push(std::mem::take(&mut field)),
                '\r' if !in_quotes => {}
                '\n' if !in_quotes => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
        record.push(field);
        records.push(record);
        records
    }

    #[test]
    fn test_project_renames_and_omits_missing() {
        let rows = vec![row(json!({"id": 1, "email": "a@b.com", "secret": "x"})), row(json!({"id": 2}))];
        let columns = vec![column("email", "Email", 0), column("id", "ID", 1)];

        let projected = project(&rows, &columns);
        assert_eq!(Value::Object(projected[0].clone()), json!({"Email": "a@b.com", "ID": 1}));
        assert_eq!(projected[0].keys().collect::<Vec<_>>(), vec!["Email", "ID"]);
        assert_eq!(Value::Object(projected[1].clone()), json!({"ID": 2}));
    }

    #[test]
    fn test_json_export() {
        let columns = vec![column("id", "ID", 0)];
        let projected = project(&[row(json!({"id": 1}))], &columns);
        let file = serialize(&projected, &columns, ExportFormat::Json).unwrap();

        assert_eq!(file.content, "[\n  {\n    \"ID\": 1\n  }\n]");
        assert_eq!(file.mime_type, "application/json");
        assert!(file.file_name.starts_with("report-"));
        assert!(file.file_name.ends_with(".json"));
    }

    #[test]
    fn test_csv_escaping() {
        let columns = vec![column("name", "Name", 0)];
        let projected = project(&[row(json!({"name": "A, \"B\""}))], &columns);
        let file = serialize(&projected, &columns, ExportFormat::Csv).unwrap();

        assert_eq!(file.content, "\"Name\"\r\n\"A, \"\"B\"\"\"");
        assert_eq!(file.mime_type, "text/csv;charset=utf-8;");
        assert!(file.file_name.ends_with(".csv"));
    }

    #[test]
    fn test_csv_round_trip() {
        let columns = vec![
            column("name", "Name", 0),
            column("qty", "Quantity", 1),
            column("note", "Note", 2),
            column("tags", "Tags", 3),
        ];
        let rows = vec![
            row(json!({"name": "A, \"B\"", "qty": 3, "note": null, "tags": ["x", "y"]})),
            row(json!({"name": "line\nbreak", "qty": 1.5})),
        ];
        let file = serialize(&project(&rows, &columns), &columns, ExportFormat::Csv).unwrap();
        let parsed = parse_csv(&file.content);

        assert_eq!(parsed[0], vec!["Name", "Quantity", "Note", "Tags"]);
        assert_eq!(parsed[1], vec!["A, \"B\"", "3", "", "[\"x\",\"y\"]"]);
        assert_eq!(parsed[2], vec!["line\nbreak", "1.5", "", ""]);
    }

    #[test]
    fn test_pdf_not_implemented() {
        let err = serialize(&[], &[], ExportFormat::Pdf).unwrap_err();
        assert_eq!(err, ExplorerError::Export("PDF export is not implemented yet.".to_string()));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("exports"));
        let file = ExportFile {
            content: "[]".to_string(),
            mime_type: "application/json".to_string(),
            file_name: "report-1.json".to_string(),
        };

        let path = sink.deliver(&file).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    proptest::proptest! {
        #[test]
        fn csv_round_trips_arbitrary_text(
            cells in proptest::collection::vec(
                proptest::collection::vec(r#"[a-zA-Z0-9 ,"\r\n]{0,12}"#, 3),
                1..5,
            )
        ) {
            let columns = vec![column("a", "A", 0), column("b", "B", 1), column("c", "C", 2)];
            let rows: Vec<Row> = cells
                .iter()
                .map(|r| row(json!({"a": r[0], "b": r[1], "c": r[2]})))
                .collect();

            let file = serialize(&project(&rows, &columns), &columns, ExportFormat::Csv).unwrap();
            let parsed = parse_csv(&file.content);

            proptest::prop_assert_eq!(&parsed[0], &vec!["A", "B", "C"]);
            proptest::prop_assert_eq!(&parsed[1..], &cells[..]);
        }
    }
}
