use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tracing::{info, warn};

use memlog_common::DEFAULT_TCP_PORT;

const LEVELS: [&str; 4] = ["INFO", "WARN", "ERROR", "DEBUG"];

#[derive(Parser, Debug)]
#[command(name = "memlog-cli", about = "Envia linhas de log para o memlog via TCP")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, short, default_value_t = DEFAULT_TCP_PORT)]
    port: u16,

    /// Gera tráfego sintético em vez de ler do stdin
    #[arg(long)]
    mock: bool,
    /// Linhas por lote no modo mock
    #[arg(long, default_value_t = 50)]
    batch: usize,
    /// Intervalo entre lotes no modo mock, em segundos
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,
    /// Espera antes de reconectar, em segundos
    #[arg(long, default_value_t = 5)]
    retry_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memlog_cli=info".into()),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let sent = tokio::select! {
        sent = run(&args, &addr) => sent?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrompido");
            return Ok(());
        }
    };

    info!("{sent} linhas enviadas");
    Ok(())
}

async fn run(args: &Args, addr: &str) -> anyhow::Result<u64> {
    let retry = Duration::from_secs(args.retry_secs);
    let mut sent = 0u64;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    // Linha lida do stdin mas ainda não confirmada pelo flush
    let mut pending = None;

    loop {
        let stream = connect(addr, retry).await;
        let mut writer = BufWriter::new(stream);

        let result = if args.mock {
            send_mock(&mut writer, args, &mut sent).await
        } else {
            send_stdin(&mut writer, &mut stdin, &mut pending, &mut sent).await
        };

        match result {
            // stdin chegou ao fim
            Ok(()) => return Ok(sent),
            Err(e) => {
                warn!("conexão perdida: {e}. Reconectando em {}s...", retry.as_secs());
                tokio::time::sleep(retry).await;
            }
        }
    }
}

/// Tenta conectar até conseguir.
async fn connect(addr: &str, retry: Duration) -> TcpStream {
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("conectado a {addr}");
                return stream;
            }
            Err(e) => {
                warn!("falha ao conectar em {addr}: {e}. Tentando em {}s...", retry.as_secs());
                tokio::time::sleep(retry).await;
            }
        }
    }
}

/// Envia as linhas do stdin. Se a escrita falhar, a linha fica em `pending`
/// e é reenviada primeiro na próxima conexão.
async fn send_stdin<W, R>(
    writer: &mut W,
    lines: &mut tokio::io::Lines<R>,
    pending: &mut Option<String>,
    sent: &mut u64,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => match lines.next_line().await? {
                Some(line) if line.is_empty() => continue,
                Some(line) => line,
                None => return Ok(()),
            },
        };
        let line = pending.insert(line);
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        *pending = None;
        *sent += 1;
    }
}

async fn send_mock<W: AsyncWrite + Unpin>(
    writer: &mut W,
    args: &Args,
    sent: &mut u64,
) -> std::io::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    loop {
        ticker.tick().await;
        for _ in 0..args.batch {
            *sent += 1;
            writer.write_all(mock_line(*sent).as_bytes()).await?;
        }
        writer.flush().await?;
        info!("lote de {} linhas enviado (total: {sent})", args.batch);
    }
}

fn mock_line(n: u64) -> String {
    let level = LEVELS[(n % LEVELS.len() as u64) as usize];
    format!(
        "[{}] mock log #{n} level={level} msg=\"test message {n}\"\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
