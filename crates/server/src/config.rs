use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use memlog_common::{
    ConfigError, DEFAULT_CACHE_SIZE_MB, DEFAULT_HOST, DEFAULT_HTTP_PORT, DEFAULT_TCP_PORT,
    MAX_CONNECTIONS,
};
use memlog_storage::Capacity;

const MB: usize = 1024 * 1024;

/// Configuração do servidor, carregada uma única vez na inicialização.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub tcp_port: u16,
    pub http_port: u16,
    pub max_connections: usize,
    pub capacity: CapacityConfig,
    /// Formato antigo (`cache_size_mb: 100`). Se presente, substitui `capacity`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size_mb: Option<usize>,
}

/// Exatamente um dos campos deve estar preenchido.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub megabytes: Option<usize>,
}

impl CapacityConfig {
    pub fn to_capacity(&self) -> Result<Capacity, ConfigError> {
        let capacity = match (self.entries, self.bytes, self.megabytes) {
            (None, None, None) => Capacity::Bytes(megabytes(DEFAULT_CACHE_SIZE_MB)?),
            (Some(n), None, None) => Capacity::Entries(n),
            (None, Some(n), None) => Capacity::Bytes(n),
            (None, None, Some(mb)) => Capacity::Bytes(megabytes(mb)?),
            _ => {
                return Err(ConfigError::Invalid(
                    "capacity aceita apenas um de: entries, bytes, megabytes".into(),
                ));
            }
        };
        if capacity.limit() == 0 {
            return Err(ConfigError::Invalid("capacity deve ser maior que zero".into()));
        }
        Ok(capacity)
    }
}

fn megabytes(mb: usize) -> Result<usize, ConfigError> {
    mb.checked_mul(MB)
        .ok_or_else(|| ConfigError::Invalid(format!("capacity grande demais: {mb} MB")))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            tcp_port: DEFAULT_TCP_PORT,
            http_port: DEFAULT_HTTP_PORT,
            max_connections: MAX_CONNECTIONS,
            capacity: CapacityConfig::default(),
            cache_size_mb: None,
        }
    }
}

impl Config {
    /// Lê o arquivo YAML. Arquivo inexistente resulta na configuração padrão.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Config::from_yaml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("{} não encontrado, usando configuração padrão", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        // Arquivo vazio equivale a nenhum campo preenchido
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store_capacity()?;
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections deve ser maior que zero".into(),
            ));
        }
        Ok(())
    }

    pub fn store_capacity(&self) -> Result<Capacity, ConfigError> {
        match self.cache_size_mb {
            Some(mb) => CapacityConfig {
                megabytes: Some(mb),
                ..Default::default()
            }
            .to_capacity(),
            None => self.capacity.to_capacity(),
        }
    }

    pub fn tcp_addr(&self) -> String {
        format!("{}:{}", self.host, self.tcp_port)
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}
