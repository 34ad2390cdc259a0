use std::{fmt::Formatter, num::ParseIntError, str::FromStr};

/// A spreadsheet row. Stored zero-based, displayed 1-based like the sheet does.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row {
    index: u32,
}

impl Row {
    /// The header line of a range that starts at the top of the sheet.
    pub const HEADER: Row = Row { index: 0 };

    pub fn from_index(index: u32) -> Self {
        Row { index }
    }

    pub fn from_row(row: u32) -> Self {
        Row {
            index: row.saturating_sub(1),
        }
    }

    /// Row holding the `data_index`-th record below the header line.
    /// # Examples
    /// ```
    /// use licitacoes_core::domain::sheets::row::Row;
    /// assert_eq!(Row::after_header(0).row(), 2);
    /// assert_eq!(Row::after_header(4).row(), 6);
    /// ```
    pub fn after_header(data_index: usize) -> Self {
        let data_index = u32::try_from(data_index).unwrap_or(u32::MAX);
        Row::from_index(data_index.saturating_add(1))
    }

    /// 1-based row number, as used in A1 notation.
    pub fn row(&self) -> u32 {
        self.index.saturating_add(1)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Position of this row among the records below the header, if it is one.
    pub fn data_index(&self) -> Option<usize> {
        self.index.checked_sub(1).map(|i| i as usize)
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.row())
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row(index: {}, row: {})", self.index(), self.row())
    }
}

impl FromStr for Row {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Row::from_row(s.parse::<u32>()?))
    }
}
