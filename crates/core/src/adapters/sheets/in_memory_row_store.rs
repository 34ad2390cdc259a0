use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use error_stack::report;
use tracing::instrument;

use crate::domain::{
    sheets::{
        a1_notation::A1Notation,
        column::{parse_col, Column},
        row::Row,
    },
    SheetsCredentials,
};
use crate::ports::row_store::{RowStore, RowStoreError};

/// A write as it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub range: String,
    pub rows: Vec<Vec<String>>,
}

/// Sheets kept in process memory, addressed with the same A1 ranges the Google store gets.
/// Every write is also kept in order, so callers can check exactly what was sent.
#[derive(Debug, Default)]
pub struct InMemoryRowStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    writes: Mutex<Vec<RecordedWrite>>,
    failure: Mutex<Option<String>>,
    write_failure: Mutex<Option<String>>,
}

struct ParsedRange {
    sheet: String,
    start: Column,
    start_row: Option<Row>,
    end: Column,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn split_cell(cell: &str) -> Option<(Column, Option<Row>)> {
    let digits_at = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(digits_at);
    let column = parse_col(letters).ok()?;
    let row = match digits {
        "" => None,
        digits => Some(digits.parse::<Row>().ok()?),
    };
    Some((column, row))
}

fn parse_range(range: &A1Notation) -> Option<ParsedRange> {
    let (sheet, local) = range.as_ref().rsplit_once('!')?;
    let sheet = sheet
        .strip_prefix('\'')?
        .strip_suffix('\'')?
        .replace("''", "'");
    let (start, end) = local.split_once(':')?;
    let (start, start_row) = split_cell(start)?;
    let (end, _) = split_cell(end)?;
    Some(ParsedRange {
        sheet,
        start,
        start_row,
        end,
    })
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole content of `name`, header line included.
    pub fn insert_sheet(&self, name: &str, lines: Vec<Vec<String>>) {
        lock(&self.sheets).insert(name.to_owned(), lines);
    }

    pub fn sheet(&self, name: &str) -> Option<Vec<Vec<String>>> {
        lock(&self.sheets).get(name).cloned()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        lock(&self.writes).clone()
    }

    /// Makes every following call fail with `message`, as an unreachable store would.
    pub fn fail_with(&self, message: &str) {
        lock(&self.failure).replace(message.to_owned());
    }

    /// Makes every following write fail with `message` while reads keep working.
    pub fn fail_writes_with(&self, message: &str) {
        lock(&self.write_failure).replace(message.to_owned());
    }

    fn failure(&self) -> Option<String> {
        lock(&self.failure).clone()
    }

    fn write_failure(&self) -> Option<String> {
        self.failure().or_else(|| lock(&self.write_failure).clone())
    }
}

#[async_trait::async_trait]
impl RowStore for InMemoryRowStore {
    #[instrument(skip(self, _credentials), fields(range = %range))]
    async fn get_range(
        &self,
        _credentials: &SheetsCredentials,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, RowStoreError> {
        if let Some(message) = self.failure() {
            return Err(report!(RowStoreError::fetch(range, message)));
        }
        let parsed = parse_range(range).ok_or_else(|| {
            report!(RowStoreError::fetch(
                range,
                format!("Unable to parse range: {}", range)
            ))
        })?;

        let sheets = lock(&self.sheets);
        let lines = sheets.get(&parsed.sheet).ok_or_else(|| {
            report!(RowStoreError::fetch(
                range,
                format!("Unable to parse range: {}", range)
            ))
        })?;

        let skip_lines = parsed.start_row.map_or(0, |row| row.index() as usize);
        let width = parsed.end.position().saturating_sub(parsed.start.position()) + 1;
        Ok(lines
            .iter()
            .skip(skip_lines)
            .map(|line| {
                line.iter()
                    .skip(parsed.start.position())
                    .take(width)
                    .cloned()
                    .collect()
            })
            .collect())
    }

    #[instrument(skip(self, _credentials, rows), fields(range = %range))]
    async fn put_range(
        &self,
        _credentials: &SheetsCredentials,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> error_stack::Result<(), RowStoreError> {
        if let Some(message) = self.write_failure() {
            return Err(report!(RowStoreError::write(range, message)));
        }
        let parsed = parse_range(range).ok_or_else(|| {
            report!(RowStoreError::write(
                range,
                format!("Unable to parse range: {}", range)
            ))
        })?;

        {
            let mut sheets = lock(&self.sheets);
            let lines = sheets.entry(parsed.sheet).or_default();
            let first_line = parsed.start_row.map_or(0, |row| row.index() as usize);
            for (offset, cells) in rows.iter().enumerate() {
                let index = first_line + offset;
                if lines.len() <= index {
                    lines.resize(index + 1, Vec::new());
                }
                let line = &mut lines[index];
                let start = parsed.start.position();
                if line.len() < start + cells.len() {
                    line.resize(start + cells.len(), String::new());
                }
                line[start..start + cells.len()].clone_from_slice(cells);
            }
        }

        lock(&self.writes).push(RecordedWrite {
            range: range.to_string(),
            rows,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> SheetsCredentials {
        SheetsCredentials::new("k", "s")
    }

    fn lines(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|line| line.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_get_range_slices_columns() {
        let store = InMemoryRowStore::new();
        store.insert_sheet("s", lines(&[&["a", "b", "c"], &["1", "2", "3"]]));
        let cells = store
            .get_range(&credentials(), &A1Notation("'s'!B:C".to_string()))
            .await
            .unwrap();
        assert_eq!(cells, lines(&[&["b", "c"], &["2", "3"]]));
    }

    #[tokio::test]
    async fn test_get_range_of_unknown_sheet_fails() {
        let store = InMemoryRowStore::new();
        let error = store
            .get_range(&credentials(), &A1Notation("'nope'!A:B".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(
            error.current_context(),
            RowStoreError::FailedToFetchRange { .. }
        ));
    }

    #[tokio::test]
    async fn test_put_range_writes_one_row_and_records_it() {
        let store = InMemoryRowStore::new();
        store.insert_sheet("s", lines(&[&["a", "b"], &["1", "2"], &["3", "4"]]));
        store
            .put_range(
                &credentials(),
                &A1Notation("'s'!A3:B3".to_string()),
                lines(&[&["x", ""]]),
            )
            .await
            .unwrap();

        assert_eq!(
            store.sheet("s").unwrap(),
            lines(&[&["a", "b"], &["1", "2"], &["x", ""]])
        );
        assert_eq!(
            store.writes(),
            vec![RecordedWrite {
                range: "'s'!A3:B3".to_string(),
                rows: lines(&[&["x", ""]]),
            }]
        );
    }

    #[tokio::test]
    async fn test_put_range_grows_short_lines() {
        let store = InMemoryRowStore::new();
        store.insert_sheet("s", lines(&[&["a"]]));
        store
            .put_range(
                &credentials(),
                &A1Notation("'s'!B2:C2".to_string()),
                lines(&[&["x", "y"]]),
            )
            .await
            .unwrap();
        assert_eq!(store.sheet("s").unwrap(), lines(&[&["a"], &["", "x", "y"]]));
    }

    #[tokio::test]
    async fn test_failure_is_reported_verbatim() {
        let store = InMemoryRowStore::new();
        store.fail_with("connection refused");
        let error = store
            .get_range(&credentials(), &A1Notation("'s'!A:B".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.current_context().upstream_message(), "connection refused");
    }

    #[tokio::test]
    async fn test_write_failure_keeps_reads_working() {
        let store = InMemoryRowStore::new();
        store.insert_sheet("s", lines(&[&["a"], &["1"]]));
        store.fail_writes_with("read-only");
        let cells = store
            .get_range(&credentials(), &A1Notation("'s'!A:A".to_string()))
            .await
            .unwrap();
        assert_eq!(cells, lines(&[&["a"], &["1"]]));

        let error = store
            .put_range(
                &credentials(),
                &A1Notation("'s'!A2:A2".to_string()),
                lines(&[&["x"]]),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            error.current_context(),
            RowStoreError::FailedToWriteRange { .. }
        ));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_parse_range_unquotes_sheet() {
        let parsed = parse_range(&A1Notation("'it''s'!C4:D4".to_string())).unwrap();
        assert_eq!(parsed.sheet, "it's");
        assert_eq!(parsed.start.to_string(), "C");
        assert_eq!(parsed.start_row, Some(Row::from_row(4)));
        assert_eq!(parsed.end.to_string(), "D");
    }
}
