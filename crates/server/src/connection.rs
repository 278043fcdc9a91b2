use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;

use memlog_common::{ConnectionError, INITIAL_BUFFER_CAPACITY};
use memlog_protocol::LineDecoder;

/// Wrapper sobre o stream de um produtor, com buffer para leitura de linhas.
pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    decoder: LineDecoder,
    eof: bool,
}

impl<S: AsyncRead + Unpin> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self::with_decoder(stream, LineDecoder::new())
    }

    pub fn with_decoder(stream: S, decoder: LineDecoder) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            decoder,
            eof: false,
        }
    }

    /// Lê a próxima linha do stream. Retorna None no EOF; uma linha final
    /// sem `\n` ainda é entregue antes disso.
    pub async fn read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        loop {
            if self.eof {
                return Ok(self.decoder.decode_eof(&mut self.buffer)?);
            }

            if let Some(line) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(line));
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                self.eof = true;
            }
        }
    }
}
