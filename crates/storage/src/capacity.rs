use std::fmt;

use serde::Serialize;

use crate::entry::Entry;

/// Overhead fixo contabilizado por entrada na política por bytes.
pub const ENTRY_OVERHEAD: usize = 64;

/// Limite de retenção do store. As duas políticas são alternativas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "policy", content = "limit")]
pub enum Capacity {
    /// Número máximo de entradas.
    Entries(usize),
    /// Soma máxima de `Entry::size()`.
    Bytes(usize),
}

impl Capacity {
    pub fn limit(&self) -> usize {
        match *self {
            Capacity::Entries(n) | Capacity::Bytes(n) => n,
        }
    }

    /// Uso medido na unidade desta política.
    pub fn current(&self, usage: &Usage) -> usize {
        match self {
            Capacity::Entries(_) => usage.entries,
            Capacity::Bytes(_) => usage.bytes,
        }
    }

    pub fn is_exceeded(&self, usage: &Usage) -> bool {
        self.current(usage) > self.limit()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Entries(n) => write!(f, "{n} entradas"),
            Capacity::Bytes(n) => write!(f, "{n} bytes"),
        }
    }
}

/// Contadores de uso, sempre mantidos nas duas unidades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub entries: usize,
    pub bytes: usize,
}

impl Usage {
    /// Recalcula o uso do zero.
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Usage {
        let mut usage = Usage::default();
        for entry in entries {
            usage.add(entry);
        }
        usage
    }

    pub(crate) fn add(&mut self, entry: &Entry) {
        self.entries += 1;
        self.bytes += entry.size();
    }

    pub(crate) fn remove(&mut self, entry: &Entry) {
        self.entries -= 1;
        self.bytes -= entry.size();
    }
}
