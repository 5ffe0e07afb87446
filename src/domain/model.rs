use crate::utils::error::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// In-memory tabular value: ordered column names plus rows of JSON values.
///
/// Every row holds exactly one value per column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ReaderError::ExtractionError {
                    message: format!(
                        "row {} has {} values but {} columns were declared",
                        i,
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a frame from JSON objects. Columns appear in first-seen order;
    /// keys absent from a record become `null`.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReaderError::column_not_found(name))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

/// Extra arguments captured alongside a transformer: ordered positional
/// values and named values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// Looks a parameter up by name first, then by position.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.kwargs.get(name).or_else(|| self.args.get(index))
    }

    pub fn require(&self, index: usize, name: &str) -> Result<&Value> {
        self.get(index, name)
            .ok_or_else(|| ReaderError::argument(name, "missing required argument"))
    }

    pub fn str(&self, index: usize, name: &str) -> Result<&str> {
        self.require(index, name)?
            .as_str()
            .ok_or_else(|| ReaderError::argument(name, "expected a string"))
    }

    pub fn u64(&self, index: usize, name: &str) -> Result<u64> {
        self.require(index, name)?
            .as_u64()
            .ok_or_else(|| ReaderError::argument(name, "expected a non-negative integer"))
    }

    pub fn bool_or(&self, index: usize, name: &str, default: bool) -> Result<bool> {
        match self.get(index, name) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| ReaderError::argument(name, "expected a boolean")),
        }
    }

    /// Column list given either as one array argument or as the positional
    /// arguments themselves.
    pub fn columns(&self, name: &str) -> Result<Vec<String>> {
        let values: Vec<&Value> = match self.kwargs.get(name) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(other) => vec![other],
            None => match self.args.as_slice() {
                [Value::Array(items)] => items.iter().collect(),
                args => args.iter().collect(),
            },
        };

        if values.is_empty() {
            return Err(ReaderError::argument(name, "at least one column is required"));
        }

        values
            .into_iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ReaderError::argument(name, "column names must be strings"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = DataFrame::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![json!(1), json!(2)], vec![json!(3)]],
        );
        assert!(matches!(result, Err(ReaderError::ExtractionError { .. })));
    }

    #[test]
    fn test_from_records_fills_missing_keys() {
        let df = DataFrame::from_records(vec![
            object(json!({"name": "ann", "age": 31})),
            object(json!({"name": "bob", "city": "Taipei"})),
        ]);

        assert_eq!(df.columns(), ["name", "age", "city"]);
        assert_eq!(df.rows()[1], vec![json!("bob"), Value::Null, json!("Taipei")]);
        assert_eq!(df.records()[0].get("age"), Some(&json!(31)));
    }

    #[test]
    fn test_column_lookup() {
        let df = DataFrame::from_records(vec![object(json!({"id": 1}))]);
        assert_eq!(df.column("id").unwrap(), vec![&json!(1)]);
        assert!(matches!(
            df.column("missing"),
            Err(ReaderError::ColumnNotFound { column }) if column == "missing"
        ));
    }

    #[test]
    fn test_arguments_named_takes_precedence() {
        let args = Arguments::new().arg("age").kwarg("column", "name");
        assert_eq!(args.str(0, "column").unwrap(), "name");
        assert_eq!(args.str(0, "other").unwrap(), "age");
        assert!(args.require(3, "value").is_err());
    }

    #[test]
    fn test_arguments_columns_forms() {
        let positional = Arguments::new().arg("a").arg("b");
        assert_eq!(positional.columns("columns").unwrap(), ["a", "b"]);

        let array = Arguments::new().arg(json!(["a", "b"]));
        assert_eq!(array.columns("columns").unwrap(), ["a", "b"]);

        let named = Arguments::new().kwarg("columns", json!(["c"]));
        assert_eq!(named.columns("columns").unwrap(), ["c"]);

        assert!(Arguments::new().columns("columns").is_err());
        assert!(Arguments::new().arg(1).columns("columns").is_err());
    }
}
