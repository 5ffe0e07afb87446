//! Built-in column-level operations over [`DataFrame`].
//!
//! Every function has the transformer shape `(DataFrame, &Arguments) -> Result<DataFrame>`,
//! so it can be attached with `Reader::with_` directly or by name through
//! [`Transformable`].

use crate::domain::model::{Arguments, DataFrame};
use crate::domain::ports::Transformable;
use crate::utils::error::{ReaderError, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Operation names understood by [`Transformable::transform`] on a [`DataFrame`].
pub const OPERATIONS: &[&str] = &[
    "filter",
    "select",
    "drop",
    "rename",
    "with_column",
    "limit",
    "distinct",
    "sort",
];

impl Transformable for DataFrame {
    fn transform(self, operation: &str, arguments: &Arguments) -> Result<Self> {
        match operation {
            "filter" => filter(self, arguments),
            "select" => select(self, arguments),
            "drop" => drop(self, arguments),
            "rename" => rename(self, arguments),
            "with_column" => with_column(self, arguments),
            "limit" => limit(self, arguments),
            "distinct" => distinct(self, arguments),
            "sort" => sort(self, arguments),
            other => Err(ReaderError::UnknownOperation {
                name: other.to_string(),
            }),
        }
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn equals(left: &Value, right: &Value) -> bool {
    match compare(left, right) {
        Some(ordering) => ordering == Ordering::Equal,
        None => left == right,
    }
}

/// Keeps rows where `column <op> value` holds. Row order is preserved.
///
/// `op` is one of `==`, `!=`, `>`, `>=`, `<`, `<=`. Ordering operators never
/// match values of different kinds, including `null`.
pub fn filter(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let column = args.str(0, "column")?;
    let op = args.str(1, "op")?.to_string();
    let value = args.require(2, "value")?.clone();
    let idx = df.column_index(column)?;

    let keep: fn(&Value, &Value) -> bool = match op.as_str() {
        "==" => |l, r| equals(l, r),
        "!=" => |l, r| !equals(l, r),
        ">" => |l, r| compare(l, r) == Some(Ordering::Greater),
        ">=" => |l, r| matches!(compare(l, r), Some(Ordering::Greater | Ordering::Equal)),
        "<" => |l, r| compare(l, r) == Some(Ordering::Less),
        "<=" => |l, r| matches!(compare(l, r), Some(Ordering::Less | Ordering::Equal)),
        _ => {
            return Err(ReaderError::argument(
                "op",
                format!("unsupported comparison '{}'", op),
            ))
        }
    };

    let (columns, rows) = df.into_parts();
    let rows = rows.into_iter().filter(|row| keep(&row[idx], &value)).collect();
    DataFrame::new(columns, rows)
}

/// Projects the given columns, in the given order.
pub fn select(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let wanted = args.columns("columns")?;
    let indices = wanted
        .iter()
        .map(|c| df.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let (_, rows) = df.into_parts();
    let rows = rows
        .into_iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    DataFrame::new(wanted, rows)
}

pub fn drop(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let dropped = args.columns("columns")?;
    for column in &dropped {
        df.column_index(column)?;
    }

    let keep: Vec<usize> = df
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| !dropped.contains(c))
        .map(|(i, _)| i)
        .collect();

    let (columns, rows) = df.into_parts();
    let columns = keep.iter().map(|&i| columns[i].clone()).collect();
    let rows = rows
        .into_iter()
        .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
        .collect();
    DataFrame::new(columns, rows)
}

pub fn rename(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let from = args.str(0, "from")?;
    let to = args.str(1, "to")?;
    let idx = df.column_index(from)?;

    if from != to && df.columns().iter().any(|c| c == to) {
        return Err(ReaderError::argument(
            "to",
            format!("column '{}' already exists", to),
        ));
    }

    let (mut columns, rows) = df.into_parts();
    columns[idx] = to.to_string();
    DataFrame::new(columns, rows)
}

/// Adds a literal column, or overwrites it when the name already exists.
pub fn with_column(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let name = args.str(0, "name")?.to_string();
    let value = args.require(1, "value")?.clone();
    let existing = df.columns().iter().position(|c| *c == name);

    let (mut columns, mut rows) = df.into_parts();
    match existing {
        Some(idx) => rows.iter_mut().for_each(|row| row[idx] = value.clone()),
        None => {
            columns.push(name);
            rows.iter_mut().for_each(|row| row.push(value.clone()));
        }
    }
    DataFrame::new(columns, rows)
}

pub fn limit(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let n = usize::try_from(args.u64(0, "n")?)
        .map_err(|_| ReaderError::argument("n", "limit is too large"))?;
    let (columns, mut rows) = df.into_parts();
    rows.truncate(n);
    DataFrame::new(columns, rows)
}

/// Removes duplicate rows, keeping the first occurrence.
pub fn distinct(df: DataFrame, _args: &Arguments) -> Result<DataFrame> {
    let (columns, rows) = df.into_parts();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(serde_json::to_string(&row)?) {
            unique.push(row);
        }
    }
    DataFrame::new(columns, unique)
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Total order over JSON values: kinds rank bool < number < string < array
/// < object, then values compare within their kind.
fn sort_order(left: &Value, right: &Value) -> Ordering {
    kind_rank(left)
        .cmp(&kind_rank(right))
        .then_with(|| compare(left, right).unwrap_or(Ordering::Equal))
}

/// Stable sort on one column. Mixed kinds are grouped by kind; arrays and
/// objects keep their relative order. Nulls go last in both directions.
pub fn sort(df: DataFrame, args: &Arguments) -> Result<DataFrame> {
    let column = args.str(0, "column")?;
    let descending = args.bool_or(1, "descending", false)?;
    let idx = df.column_index(column)?;

    let (columns, mut rows) = df.into_parts();
    rows.sort_by(|a, b| match (&a[idx], &b[idx]) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (l, r) => {
            let ordering = sort_order(l, r);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    });
    DataFrame::new(columns, rows)
}
