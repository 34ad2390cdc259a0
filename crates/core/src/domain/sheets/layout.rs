use thiserror::Error;

use super::{column::Column, sheet_range::SheetRange};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Column {column} ({role}) is outside of the range {range}")]
    ColumnOutsideRange {
        role: &'static str,
        column: Column,
        range: String,
    },
}

fn locate(sheet: &SheetRange, role: &'static str, column: Column) -> Result<Column, LayoutError> {
    sheet
        .columns
        .offset_of(column)
        .ok_or_else(|| LayoutError::ColumnOutsideRange {
            role,
            column,
            range: sheet.to_string(),
        })
}

/// Where the top-level records live. Key columns are stored relative to the range start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentSheet {
    pub sheet: SheetRange,
    pub key: Column,
}

impl ParentSheet {
    pub fn new(sheet: SheetRange, key_column: Column) -> Result<Self, LayoutError> {
        let key = locate(&sheet, "key", key_column)?;
        Ok(ParentSheet { sheet, key })
    }
}

/// Where the line items live: each row names its parent and its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSheet {
    pub sheet: SheetRange,
    pub parent_key: Column,
    pub ordinal: Column,
}

impl ChildSheet {
    pub fn new(
        sheet: SheetRange,
        parent_key_column: Column,
        ordinal_column: Column,
    ) -> Result<Self, LayoutError> {
        let parent_key = locate(&sheet, "parent key", parent_key_column)?;
        let ordinal = locate(&sheet, "ordinal", ordinal_column)?;
        Ok(ChildSheet {
            sheet,
            parent_key,
            ordinal,
        })
    }
}
