pub mod credentials;
pub mod records;
pub mod sheets;

pub use credentials::SheetsCredentials;
pub use records::*;
