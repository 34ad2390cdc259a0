use std::{fmt::Formatter, str::FromStr};
use thiserror::Error;

use super::{
    column::{parse_col, Column, ColumnParseError},
    row::Row,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for A1Notation {
    fn from(s: String) -> Self {
        A1Notation(s)
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum A1NotationParseError {
    #[error("Expected a column range like 'A:AB', got '{0}'")]
    NotAColumnRange(String),
    #[error("Error parsing column: {0}")]
    ColumnParseError(#[from] ColumnParseError),
    #[error("Column range ends before it starts")]
    Reversed,
}

/// Sheet titles are always quoted, with embedded quotes doubled.
fn quote_sheet_title(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

fn with_sheet(sheet_name: Option<&str>, local: String) -> A1Notation {
    match sheet_name {
        Some(sheet_name) => A1Notation(format!("{}!{}", quote_sheet_title(sheet_name), local)),
        None => A1Notation(local),
    }
}

/// An unbounded column span such as `A:AB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct ColumnRange {
    pub start: Column,
    pub end: Column,
}

impl ColumnRange {
    pub fn width(&self) -> usize {
        (self.end.value() - self.start.value() + 1) as usize
    }

    /// Where `column` sits inside a line of cells read from this range.
    pub fn offset_of(&self, column: Column) -> Option<Column> {
        if column < self.start || column > self.end {
            return None;
        }
        Some(Column::from_position(
            (column.value() - self.start.value()) as usize,
        ))
    }

    /// The cells of a single row, `width` columns wide starting at the range's first column.
    pub fn single_row(&self, sheet_name: Option<&str>, row: Row, width: usize) -> A1Notation {
        let end = self.start.span(width.max(1));
        with_sheet(
            sheet_name,
            format!("{}{}:{}{}", self.start, row, end, row),
        )
    }
}

impl ToA1Notation for ColumnRange {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        with_sheet(sheet_name, format!("{}:{}", self.start, self.end))
    }
}

impl FromStr for ColumnRange {
    type Err = A1NotationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| A1NotationParseError::NotAColumnRange(s.to_owned()))?;
        let start = parse_col(start.trim())?;
        let end = parse_col(end.trim())?;
        if end < start {
            return Err(A1NotationParseError::Reversed);
        }
        Ok(ColumnRange { start, end })
    }
}

impl TryFrom<String> for ColumnRange {
    type Error = A1NotationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
