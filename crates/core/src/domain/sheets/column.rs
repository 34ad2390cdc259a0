use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

/// A spreadsheet column, stored 1-based (`A` = 1).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct Column(u32);

impl Column {
    pub fn from_number(value: u32) -> Result<Self, ColumnParseError> {
        if value == 0 {
            return Err(ColumnParseError::Zero);
        }
        Ok(Column(value))
    }

    /// Column for a zero-based position inside a row of cells.
    pub fn from_position(position: usize) -> Self {
        Column(u32::try_from(position).unwrap_or(u32::MAX - 1) + 1)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Zero-based position of this column inside a row of cells.
    pub fn position(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Column `count - 1` places to the right of this one.
    pub fn span(&self, count: usize) -> Column {
        let offset = u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX);
        Column(self.0.saturating_add(offset))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnParseError {
    #[error("Non-alphabetic character in column")]
    NonAlphabeticCharacter,
    #[error("Column letters cannot be empty")]
    Empty,
    #[error("Column number cannot be zero")]
    Zero,
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_col(s)
    }
}

impl TryFrom<String> for Column {
    type Error = ColumnParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_col(value)
    }
}

impl From<Column> for String {
    fn from(col: Column) -> Self {
        number_to_letters(col.0)
    }
}

pub fn parse_col<T: AsRef<str>>(col_str: T) -> Result<Column, ColumnParseError> {
    let col_str = col_str.as_ref();
    if col_str.is_empty() {
        return Err(ColumnParseError::Empty);
    }
    if col_str.chars().any(|c| !c.is_ascii_alphabetic()) {
        return Err(ColumnParseError::NonAlphabeticCharacter);
    }

    let col_num = col_str
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .fold(0u32, |acc, c| {
            acc.saturating_mul(26)
                .saturating_add(c as u32 - 'A' as u32 + 1)
        });

    Ok(Column(col_num))
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}
