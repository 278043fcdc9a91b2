/// Erros do protocolo de ingestão (linhas delimitadas por `\n`).
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("linha excede tamanho máximo ({0} bytes)")]
    LineTooLong(usize),
}

/// Erros de conexão TCP.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Erros ao carregar a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("falha ao ler arquivo de configuração: {0}")]
    Read(#[source] std::io::Error),
    #[error("YAML inválido: {0}")]
    Parse(String),
    #[error("configuração inválida: {0}")]
    Invalid(String),
}

/// Erro top-level do memlog.
#[derive(Debug, thiserror::Error)]
pub enum MemlogError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

pub type MemlogResult<T> = Result<T, MemlogError>;
