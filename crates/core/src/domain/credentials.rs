use std::fmt::Formatter;

/// What every spreadsheet call needs: the API key and the spreadsheet it unlocks.
#[derive(Clone, PartialEq, Eq)]
pub struct SheetsCredentials {
    pub api_key: Box<str>,
    pub spreadsheet_id: Box<str>,
}

impl SheetsCredentials {
    pub fn new(api_key: impl Into<Box<str>>, spreadsheet_id: impl Into<Box<str>>) -> Self {
        SheetsCredentials {
            api_key: api_key.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}

impl std::fmt::Debug for SheetsCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsCredentials")
            .field("api_key", &"<redacted>")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish()
    }
}
