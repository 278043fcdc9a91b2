use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{Semaphore, broadcast};
use tracing::{error, info, warn};

use memlog_common::MemlogResult;
use memlog_storage::LogStore;

use crate::{Connection, handle_connection};

/// Listener TCP de ingestão: uma task por conexão, limitado por semáforo.
pub struct IngestServer {
    listener: TcpListener,
    store: LogStore,
    limit: Arc<Semaphore>,
}

impl IngestServer {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        store: LogStore,
        max_connections: usize,
    ) -> MemlogResult<IngestServer> {
        let listener = TcpListener::bind(addr).await?;
        Ok(IngestServer {
            listener,
            store,
            limit: Arc::new(Semaphore::new(max_connections)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Aceita conexões até `shutdown` completar. As conexões abertas são
    /// avisadas e encerram após a linha em andamento.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                permit = self.limit.clone().acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break, // semáforo fechado
                },
                _ = &mut shutdown => break,
            };

            let (socket, addr) = tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok(v) => v,
                        Err(e) => {
                            error!("erro ao aceitar conexão: {e}");
                            continue;
                        }
                    }
                }
                _ = &mut shutdown => break,
            };

            info!("nova conexão: {addr}");
            let store = self.store.clone();
            let mut shutdown_rx = shutdown_tx.subscribe();

            tokio::spawn(async move {
                let conn = Connection::new(socket);
                match handle_connection(conn, store, &mut shutdown_rx).await {
                    Ok(n) => info!("conexão encerrada: {addr} ({n} linhas)"),
                    Err(e) => warn!("erro na conexão {addr}: {e}"),
                }
                drop(permit);
            });
        }

        info!("listener de ingestão encerrado");
        drop(shutdown_tx);
    }
}
