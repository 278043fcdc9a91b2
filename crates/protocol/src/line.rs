use bytes::{Buf, BytesMut};
use memlog_common::{MAX_LINE_LENGTH, ProtocolError};

/// Decoder incremental de linhas terminadas em `\n`.
///
/// O `\r` final (CRLF) é removido. Bytes que não são UTF-8 válido são
/// convertidos com substituição, já que qualquer texto é conteúdo válido.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    max_length: usize,
    // Posição até onde o buffer já foi varrido sem achar `\n`
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            scanned: 0,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Extrai a próxima linha completa do buffer. Retorna `Ok(None)` se
    /// ainda não há um terminador disponível.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        let newline = buf[self.scanned..].iter().position(|b| *b == b'\n');

        match newline {
            Some(offset) => {
                let end = self.scanned + offset;
                self.scanned = 0;
                let len = content_len(&buf[..end]);
                if len > self.max_length {
                    return Err(ProtocolError::LineTooLong(len));
                }
                let line = buf.split_to(end);
                buf.advance(1); // \n
                Ok(Some(to_text(&line)))
            }
            None => {
                self.scanned = buf.len();
                // Um `\r` no fim pode ser o início de um CRLF
                let len = content_len(&buf[..]);
                if len > self.max_length {
                    return Err(ProtocolError::LineTooLong(len));
                }
                Ok(None)
            }
        }
    }

    /// Como `decode`, mas no EOF entrega o resto do buffer como última linha
    /// mesmo sem terminador.
    pub fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        self.scanned = 0;
        let rest = buf.split();
        Ok(Some(to_text(&rest)))
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_cr(raw: &[u8]) -> &[u8] {
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

fn content_len(raw: &[u8]) -> usize {
    strip_cr(raw).len()
}

fn to_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(strip_cr(raw)).into_owned()
}
