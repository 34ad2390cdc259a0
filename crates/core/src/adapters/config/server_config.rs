use std::net::SocketAddr;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix every route is mounted under, e.g. `/api`. Empty mounts at the root.
    pub base_path: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct WriteConfig {
    /// Keep the stored value of fields an update omits instead of blanking them.
    pub merge_omitted_fields: bool,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct TelemetryConfig {
    pub level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn log_file(&self) -> Option<&str> {
        self.log_file.as_deref().filter(|path| !path.is_empty())
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint.as_deref().filter(|endpoint| !endpoint.is_empty())
    }
}
