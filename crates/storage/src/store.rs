use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use memlog_protocol::QueryOptions;
use tokio::sync::RwLock;
use tracing::debug;

use crate::capacity::{Capacity, Usage};
use crate::entry::Entry;
use crate::query::{self, QueryResult};

/// Estado protegido pelo lock.
#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<Entry>,
    usage: Usage,
    next_id: u64,
}

impl Inner {
    fn push(&mut self, entry: Entry, capacity: Capacity) -> usize {
        self.usage.add(&entry);
        self.entries.push_back(entry);

        // Despeja do lado mais antigo até voltar ao limite
        let mut evicted = 0;
        while capacity.is_exceeded(&self.usage) {
            match self.entries.pop_front() {
                Some(oldest) => {
                    self.usage.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }
}

struct SharedState {
    capacity: Capacity,
    inner: RwLock<Inner>,
}

/// Handle para o store de logs em memória. Clonar é barato; todos os clones
/// enxergam o mesmo store.
#[derive(Clone)]
pub struct LogStore {
    shared: Arc<SharedState>,
}

impl LogStore {
    pub fn new(capacity: Capacity) -> Self {
        LogStore {
            shared: Arc::new(SharedState {
                capacity,
                inner: RwLock::new(Inner::default()),
            }),
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.shared.capacity
    }

    /// Adiciona uma linha no fim mais novo e despeja as mais antigas se o
    /// limite for ultrapassado. Conteúdo vazio é ignorado.
    pub async fn append(&self, content: &str) {
        if content.is_empty() {
            return;
        }

        let mut inner = self.shared.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let entry = Entry::new(id, Utc::now(), content);
        let evicted = inner.push(entry, self.shared.capacity);
        if evicted > 0 {
            debug!("{evicted} entradas despejadas (uso: {:?})", inner.usage);
        }
    }

    /// Esvazia o store. Idempotente.
    pub async fn clear(&self) {
        let mut inner = self.shared.inner.write().await;
        inner.entries.clear();
        inner.usage = Usage::default();
    }

    /// Cópia de todas as entradas, em ordem de chegada, mais o uso atual.
    pub async fn snapshot(&self) -> (Vec<Entry>, Usage) {
        let inner = self.shared.inner.read().await;
        (inner.entries.iter().cloned().collect(), inner.usage)
    }

    /// Consulta filtrada, ordenada e paginada. Só a cópia do snapshot
    /// acontece sob o lock de leitura.
    pub async fn query(&self, options: &QueryOptions) -> QueryResult {
        let (entries, usage) = self.snapshot().await;
        query::run(&entries, usage, options)
    }

    pub async fn usage(&self) -> Usage {
        self.shared.inner.read().await.usage
    }

    pub async fn len(&self) -> usize {
        self.shared.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
