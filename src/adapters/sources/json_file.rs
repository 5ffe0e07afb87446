use super::json_records;
use crate::adapters::session::Session;
use crate::domain::model::DataFrame;
use crate::domain::ports::Source;
use crate::utils::error::{ReaderError, Result};
use serde_json::Value;
use std::path::PathBuf;

/// JSON file holding an array of objects, a single object, or one object
/// per line.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for JsonSource {
    type Client = Session;

    fn consume(&self, client: &Session) -> Result<DataFrame> {
        let path = client.resolve(&self.path);
        tracing::debug!("Reading JSON from {}", path.display());
        let content = std::fs::read_to_string(&path)?;

        let trimmed = content.trim_start();
        let whole = if trimmed.starts_with('[') {
            Some(serde_json::from_str::<Value>(&content)?)
        } else if trimmed.starts_with('{') {
            // One object per line fails to parse as a whole document.
            serde_json::from_str::<Value>(&content).ok()
        } else {
            None
        };

        let records = if let Some(value) = whole {
            json_records(value)?
        } else {
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(n, line)| -> Result<_> {
                    match serde_json::from_str::<Value>(line)? {
                        Value::Object(obj) => Ok(obj),
                        _ => Err(ReaderError::ExtractionError {
                            message: format!("line {} is not a JSON object", n + 1),
                        }),
                    }
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(DataFrame::from_records(records))
    }
}
