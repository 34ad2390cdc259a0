pub mod a1_notation;
pub mod column;
pub mod layout;
pub mod row;
pub mod sheet_range;
pub mod table;
