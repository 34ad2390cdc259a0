use super::{
    a1_notation::{A1Notation, ColumnRange, ToA1Notation},
    row::Row,
};

/// A named sheet and the columns of it that hold records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub name: String,
    pub columns: ColumnRange,
}

impl SheetRange {
    pub fn new(name: impl Into<String>, columns: ColumnRange) -> Self {
        SheetRange {
            name: name.into(),
            columns,
        }
    }

    /// Every row of the record columns, header included.
    pub fn full(&self) -> A1Notation {
        self.columns.to_a1_notation(Some(&self.name))
    }

    pub fn row(&self, row: Row, width: usize) -> A1Notation {
        self.columns.single_row(Some(&self.name), row, width)
    }
}

impl std::fmt::Display for SheetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full())
    }
}
