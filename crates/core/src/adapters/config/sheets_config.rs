use crate::domain::sheets::{
    a1_notation::ColumnRange,
    column::Column,
    layout::{ChildSheet, LayoutError, ParentSheet},
    sheet_range::SheetRange,
};

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SheetsConfig {
    pub parent: ParentSheetConfig,
    pub child: ChildSheetConfig,
}

/// `licitacoes!A:AB`, keyed by `unique_id` in column A.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct ParentSheetConfig {
    pub name: String,
    pub range: ColumnRange,
    pub key_column: Column,
}

/// `itens_licitacao!A:I`: `item_numero` in column A, parent `unique_id` in column H.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct ChildSheetConfig {
    pub name: String,
    pub range: ColumnRange,
    pub parent_key_column: Column,
    pub ordinal_column: Column,
}

impl ParentSheetConfig {
    pub fn layout(&self) -> Result<ParentSheet, LayoutError> {
        ParentSheet::new(SheetRange::new(&self.name, self.range), self.key_column)
    }
}

impl ChildSheetConfig {
    pub fn layout(&self) -> Result<ChildSheet, LayoutError> {
        ChildSheet::new(
            SheetRange::new(&self.name, self.range),
            self.parent_key_column,
            self.ordinal_column,
        )
    }
}
