use crate::adapters::session::Session;
use crate::domain::model::DataFrame;
use crate::domain::ports::Source;
use crate::utils::error::Result;
use serde_json::{Number, Value};
use std::path::PathBuf;

/// Delimited text file. Relative paths resolve against the session base path.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    has_headers: bool,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            has_headers: true,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Without a header row columns are named `_c0`, `_c1`, ...
    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

fn infer(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match field {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(field.to_string()),
    }
}

impl Source for CsvSource {
    type Client = Session;

    fn consume(&self, client: &Session) -> Result<DataFrame> {
        let path = client.resolve(&self.path);
        tracing::debug!("Reading CSV from {}", path.display());

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .from_path(&path)?;

        let mut columns: Vec<String> = if self.has_headers {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if columns.is_empty() {
                columns = (0..record.len()).map(|i| format!("_c{}", i)).collect();
            }
            rows.push(record.iter().map(infer).collect());
        }

        DataFrame::new(columns, rows)
    }
}
