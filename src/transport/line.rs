use crate::error::TransformError;
use crate::transport::Transport;
use async_trait::async_trait;
use log::warn;
use serde_json::Value;
use tokio::io::{
    stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin,
    Stdout,
};

/// One JSON message per line in, one JSON reply per line out
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    buf: Vec<u8>,
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buf: Vec::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Transport over the process's stdin and stdout
pub fn stdio() -> LineTransport<BufReader<Stdin>, Stdout> {
    LineTransport::new(BufReader::new(stdin()), stdout())
}

#[async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Value>, TransformError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!("Skipping message that is not UTF-8: {}", e);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => warn!("Skipping unreadable message: {}", e),
            }
        }
    }

    async fn send(&mut self, reply: &Value) -> Result<(), TransformError> {
        let mut line = reply.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_reads_messages_and_skips_noise() {
        let input: &[u8] = b"\n{\"type\":\"ping\"}\nnot json\n  {\"type\":\"recentRecipes\"}  \n";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(transport.recv().await.unwrap(), Some(json!({ "type": "ping" })));
        assert_eq!(
            transport.recv().await.unwrap(),
            Some(json!({ "type": "recentRecipes" }))
        );
        assert_eq!(transport.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_skips_line_that_is_not_utf8() {
        let input: &[u8] = b"\xff\xfe\n{\"type\":\"ping\"}\n";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(transport.recv().await.unwrap(), Some(json!({ "type": "ping" })));
        assert_eq!(transport.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writes_one_line_per_reply() {
        let input: &[u8] = b"";
        let mut transport = LineTransport::new(input, Vec::new());
        transport.send(&json!({ "ok": true })).await.unwrap();
        transport.send(&json!({ "success": false })).await.unwrap();

        let written = String::from_utf8(transport.into_writer()).unwrap();
        assert_eq!(written, "{\"ok\":true}\n{\"success\":false}\n");
    }
}
