use google_sheets4::api::ValueRange;
use serde_json::Value;

pub trait ValueRangeFactory {
    fn from_row_major(rows: Vec<Vec<String>>) -> Self;
}

impl ValueRangeFactory for ValueRange {
    fn from_row_major(rows: Vec<Vec<String>>) -> Self {
        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(
                rows.into_iter()
                    .map(|row| row.into_iter().map(Value::String).collect())
                    .collect(),
            ),
        }
    }
}

/// Read-side counterpart: renders fetched cells back to plain strings.
pub trait ValueRangeCells {
    fn into_rows(self) -> Vec<Vec<String>>;
}

impl ValueRangeCells for ValueRange {
    fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
