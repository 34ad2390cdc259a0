use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use error_stack::{report, Report, ResultExt};
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use super::{
    server_config::{ServerConfig, TelemetryConfig, WriteConfig},
    sheets_config::SheetsConfig,
};

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub write: WriteConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading configuration")]
    Read,
    #[error("Invalid configuration field '{path}'")]
    InvalidField { path: String },
    #[error("PORT must be a port number, got '{0}'")]
    InvalidPort(String),
    #[error("Invalid sheet layout")]
    InvalidLayout,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("server.base_path", "/api")?
        .set_default("sheets.parent.name", "licitacoes")?
        .set_default("sheets.parent.range", "A:AB")?
        .set_default("sheets.parent.key_column", "A")?
        .set_default("sheets.child.name", "itens_licitacao")?
        .set_default("sheets.child.range", "A:I")?
        .set_default("sheets.child.parent_key_column", "H")?
        .set_default("sheets.child.ordinal_column", "A")?
        .set_default("write.merge_omitted_fields", false)?
        .set_default("telemetry.level", "info")?
        .set_default("telemetry.log_file", "licitacoes.log")
}

fn field_path(track: Track) -> String {
    track
        .path()
        .iter()
        .map(|seg| match seg {
            Segment::Seq { index } => format!("[{}]", index),
            Segment::Map { key } => format!(".{}", key),
            Segment::Enum { variant } => format!("::{}", variant),
            Segment::Unknown => String::from("<?>"),
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

impl AppConfig {
    /// Defaults, then the optional file named by `CONFIG_PATH` (default `Config`), then
    /// `LICITACOES__SECTION__KEY` variables, then `PORT`.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "Config".to_string());
        let port = std::env::var("PORT")
            .ok()
            .map(|port| {
                port.parse::<u16>()
                    .map(i64::from)
                    .map_err(|_| report!(ConfigError::InvalidPort(port)))
            })
            .transpose()?;

        let builder = defaults()
            .change_context(ConfigError::Read)?
            .add_source(File::with_name(&config_path).required(false))
            .add_source(
                Environment::with_prefix("LICITACOES")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port)
            .change_context(ConfigError::Read)?;

        Self::from_builder(builder)
            .attach_printable_lazy(|| format!("Config file: {}", config_path))
    }

    pub fn from_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> error_stack::Result<Self, ConfigError> {
        let config = builder.build().change_context(ConfigError::Read)?;
        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context(ConfigError::Read)?;

        use serde::de::IntoDeserializer;
        let mut track = Track::new();
        let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
        let app_config = AppConfig::deserialize(path_de).map_err(|error| {
            Report::new(ConfigError::InvalidField {
                path: field_path(track),
            })
            .attach_printable(error.to_string())
        })?;

        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> error_stack::Result<(), ConfigError> {
        self.sheets
            .parent
            .layout()
            .change_context(ConfigError::InvalidLayout)?;
        self.sheets
            .child
            .layout()
            .change_context(ConfigError::InvalidLayout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load(toml: &str) -> error_stack::Result<AppConfig, ConfigError> {
        let builder = defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml));
        AppConfig::from_builder(builder)
    }

    #[test]
    fn test_defaults_match_the_sheet_layout() {
        let config = load("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.base_path, "/api");
        assert_eq!(config.sheets.parent.name, "licitacoes");
        assert_eq!(config.sheets.parent.range.to_string(), "A:AB");
        assert_eq!(config.sheets.child.name, "itens_licitacao");
        assert_eq!(config.sheets.child.parent_key_column.to_string(), "H");
        assert_eq!(config.sheets.child.ordinal_column.to_string(), "A");
        assert!(!config.write.merge_omitted_fields);
        assert_eq!(config.telemetry.log_file(), Some("licitacoes.log"));
        assert_eq!(config.telemetry.otlp_endpoint(), None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = load(
            r#"
            [server]
            port = 8080
            base_path = ""

            [sheets.child]
            range = "B:K"
            parent_key_column = "I"
            ordinal_column = "B"

            [write]
            merge_omitted_fields = true
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_path, "");
        let child = config.sheets.child.layout().unwrap();
        assert_eq!(child.parent_key.position(), 7);
        assert!(config.write.merge_omitted_fields);
    }

    #[test]
    fn test_bad_column_names_the_field() {
        let error = load(
            r#"
            [sheets.parent]
            key_column = "A1"
            "#,
        )
        .unwrap_err();
        match error.current_context() {
            ConfigError::InvalidField { path } => assert_eq!(path, "sheets.parent.key_column"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_key_column_outside_range_is_rejected() {
        let error = load(
            r#"
            [sheets.child]
            range = "A:C"
            "#,
        )
        .unwrap_err();
        assert!(matches!(error.current_context(), ConfigError::InvalidLayout));
    }

    #[test]
    fn test_socket_addr() {
        let config = load("").unwrap();
        assert_eq!(config.server.socket_addr().unwrap().port(), 5000);
    }
}
