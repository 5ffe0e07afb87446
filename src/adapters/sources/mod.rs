//! Extraction backends for [`Session`] clients.

mod api;
mod delimited;
mod json_file;

pub use api::ApiSource;
pub use delimited::CsvSource;
pub use json_file::JsonSource;

use crate::adapters::session::Session;
use crate::domain::model::DataFrame;
use crate::domain::ports::Source;
use crate::utils::error::{ReaderError, Result};
use serde_json::{Map, Value};

/// Accepts an array of objects or a single object.
pub(crate) fn json_records(value: Value) -> Result<Vec<Map<String, Value>>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(obj),
                other => Err(ReaderError::ExtractionError {
                    message: format!("item {} is not an object: {}", i, other),
                }),
            })
            .collect(),
        Value::Object(obj) => Ok(vec![obj]),
        other => Err(ReaderError::ExtractionError {
            message: format!("expected an array of objects, got {}", other),
        }),
    }
}

/// Reads a view another reader already published in the session catalog.
#[derive(Debug, Clone)]
pub struct TableSource {
    table: String,
}

impl TableSource {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl Source for TableSource {
    type Client = Session;

    fn consume(&self, client: &Session) -> Result<DataFrame> {
        client
            .views()
            .get(&self.table)
            .ok_or_else(|| ReaderError::ExtractionError {
                message: format!("table '{}' is not registered", self.table),
            })
    }
}

/// Fixed in-memory dataset.
#[derive(Debug, Clone)]
pub struct MemorySource {
    dataset: DataFrame,
}

impl MemorySource {
    pub fn new(dataset: DataFrame) -> Self {
        Self { dataset }
    }
}

impl Source for MemorySource {
    type Client = Session;

    fn consume(&self, _client: &Session) -> Result<DataFrame> {
        Ok(self.dataset.clone())
    }
}
