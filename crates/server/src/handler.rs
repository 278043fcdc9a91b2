use tokio::io::AsyncRead;
use tokio::sync::broadcast;
use tracing::debug;

use memlog_common::ConnectionError;
use memlog_storage::LogStore;

use crate::Connection;

/// Loop principal de uma conexão de ingestão: cada linha não vazia vira uma
/// entrada no store. Retorna o número de linhas aceitas.
pub async fn handle_connection<S: AsyncRead + Unpin>(
    mut conn: Connection<S>,
    store: LogStore,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<usize, ConnectionError> {
    let mut received = 0;

    loop {
        let line = tokio::select! {
            result = conn.read_line() => result?,
            _ = shutdown.recv() => {
                return Ok(received);
            }
        };

        let line = match line {
            Some(l) => l,
            None => return Ok(received), // EOF
        };

        if line.is_empty() {
            continue;
        }

        debug!("linha recebida: {line}");
        store.append(&line).await;
        received += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memlog_storage::Capacity;

    #[tokio::test]
    async fn appends_non_empty_lines() {
        let store = LogStore::new(Capacity::Entries(10));
        let (_tx, mut rx) = broadcast::channel::<()>(1);
        let conn = Connection::new(&b"first\n\n\r\n  \nlast"[..]);

        let received = handle_connection(conn, store.clone(), &mut rx)
            .await
            .unwrap();
        assert_eq!(received, 3);

        let (entries, _) = store.snapshot().await;
        let contents: Vec<&str> = entries.iter().map(|e| &*e.content).collect();
        assert_eq!(contents, vec!["first", "  ", "last"]);
    }

    #[tokio::test]
    async fn stops_on_shutdown() {
        let store = LogStore::new(Capacity::Entries(10));
        let (tx, mut rx) = broadcast::channel::<()>(1);
        // Stream que nunca termina
        let (_client, server) = tokio::io::duplex(64);

        let task = tokio::spawn(async move {
            handle_connection(Connection::new(server), store, &mut rx).await
        });
        drop(tx);

        assert_eq!(task.await.unwrap().unwrap(), 0);
    }
}
