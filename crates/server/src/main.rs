use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use memlog_common::MemlogResult;
use memlog_server::{AppState, Config, IngestServer, build_router};
use memlog_storage::LogStore;

#[derive(Parser, Debug)]
#[command(name = "memlog-server", about = "memlog — visualizador de logs em memória")]
struct Args {
    #[arg(long, short, default_value = "config.yml", value_name = "FILE")]
    config: PathBuf,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    tcp_port: Option<u16>,
    #[arg(long)]
    http_port: Option<u16>,
    /// Logs em JSON (uma linha por evento)
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "memlog_server=info,memlog_storage=info".into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Arquivo de configuração com as flags da linha de comando por cima.
fn load_config(args: Args) -> MemlogResult<Config> {
    let mut config = Config::load(&args.config)?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.tcp_port {
        config.tcp_port = port;
    }
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let config = load_config(args)?;

    let capacity = config.store_capacity()?;
    let store = LogStore::new(capacity);
    info!("store criado com capacidade de {capacity}");

    let ingest =
        IngestServer::bind(config.tcp_addr(), store.clone(), config.max_connections).await?;
    info!("ingestão TCP escutando em {}", config.tcp_addr());

    let http_listener = TcpListener::bind(config.http_addr()).await?;
    info!("HTTP escutando em {}", config.http_addr());

    let app = build_router(AppState {
        store,
        tcp_port: config.tcp_port,
        http_port: config.http_port,
    });

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let ingest_task = tokio::spawn(ingest.run(wait_for(shutdown_tx.subscribe())));

    let http_shutdown = wait_for(shutdown_tx.subscribe());
    let http_task = tokio::spawn(async move {
        axum::serve(http_listener, app)
            .with_graceful_shutdown(http_shutdown)
            .await
    });

    shutdown_signal().await;
    info!("shutdown signal recebido");
    drop(shutdown_tx);

    ingest_task.await?;
    if let Err(e) = http_task.await? {
        error!("servidor HTTP erro: {e}");
    }

    info!("shutdown completo");
    Ok(())
}

async fn wait_for(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("falha ao instalar handler de Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("falha ao instalar handler de SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
