use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::records::cell_text;

pub trait ValueRangeFactory {
    fn from_rows(rows: Vec<Vec<String>>) -> Self;
    /// Cell text of every row. A range without values has no rows.
    fn into_rows(self) -> Vec<Vec<String>>;
}

impl ValueRangeFactory for ValueRange {
    fn from_rows(rows: Vec<Vec<String>>) -> Self {
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

    fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}
