use crate::domain::records::{Record, RecordFields};

use super::{column::Column, row::Row};

/// Cells of a range whose first line holds the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Exact, untrimmed equality on one or more key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatcher<'a> {
    keys: Vec<(Column, &'a str)>,
}

impl<'a> KeyMatcher<'a> {
    pub fn new(column: Column, value: &'a str) -> Self {
        KeyMatcher {
            keys: vec![(column, value)],
        }
    }

    pub fn and(mut self, column: Column, value: &'a str) -> Self {
        self.keys.push((column, value));
        self
    }

    /// A cell past the end of a short row never matches.
    pub fn matches(&self, cells: &[String]) -> bool {
        self.keys.iter().all(|(column, value)| {
            cells
                .get(column.position())
                .is_some_and(|cell| cell == value)
        })
    }
}

/// Cell of `column` in a line, or an empty string past the end of a short line.
pub fn cell_at(cells: &[String], column: Column) -> &str {
    cells
        .get(column.position())
        .map(String::as_str)
        .unwrap_or_default()
}

impl SheetTable {
    pub fn from_cells(cells: Vec<Vec<String>>) -> Self {
        let mut lines = cells.into_iter();
        match lines.next() {
            Some(headers) => SheetTable {
                headers,
                rows: lines.collect(),
            },
            None => SheetTable::default(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows below the header line.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|cells| self.record(cells))
            .collect()
    }

    /// Record view of one line of cells, using this table's headers.
    pub fn record(&self, cells: &[String]) -> Record {
        Record::from_cells(&self.headers, cells)
    }

    /// Data rows accepted by `matcher`, in storage order.
    pub fn rows_matching(&self, matcher: &KeyMatcher<'_>) -> Vec<&[String]> {
        self.rows
            .iter()
            .filter(|cells| matcher.matches(cells))
            .map(Vec::as_slice)
            .collect()
    }

    /// First data row accepted by `matcher`, as its row number in the sheet.
    pub fn locate_row(&self, matcher: &KeyMatcher<'_>) -> Option<Row> {
        self.rows
            .iter()
            .position(|cells| matcher.matches(cells))
            .map(Row::after_header)
    }

    /// Builds the replacement cells for `row`, one per header. Headers missing from `fields`
    /// are blanked, unless `keep_omitted` is set, in which case they keep their current value.
    pub fn overwrite_cells(
        &self,
        row: Row,
        fields: &RecordFields,
        keep_omitted: bool,
    ) -> Vec<String> {
        let current = row.data_index().and_then(|index| self.rows.get(index));
        self.headers
            .iter()
            .enumerate()
            .map(|(position, header)| match fields.get(header) {
                Some(value) => value.to_owned(),
                None if keep_omitted => current
                    .and_then(|cells| cells.get(position))
                    .cloned()
                    .unwrap_or_default(),
                None => String::new(),
            })
            .collect()
    }
}
