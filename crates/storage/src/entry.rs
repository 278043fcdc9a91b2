use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::capacity::ENTRY_OVERHEAD;

/// Uma linha de log com o instante em que foi recebida.
///
/// Imutável: o conteúdo é compartilhado via `Arc<str>`, então clonar uma
/// entrada para um snapshot não copia o texto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Sequência de chegada, crescente dentro de um store.
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub content: Arc<str>,
}

impl Entry {
    pub fn new(id: u64, timestamp: DateTime<Utc>, content: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            timestamp,
            content: content.into(),
        }
    }

    /// Tamanho aproximado em bytes: conteúdo + overhead fixo por entrada.
    pub fn size(&self) -> usize {
        self.content.len() + ENTRY_OVERHEAD
    }
}
