//! Bridge from an async upstream body to the blocking `Read` that
//! `tiny_http` writes from.

use std::io::{self, Read};

use bytes::{Buf, Bytes};
use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, Receiver};

/// Chunks buffered between the upstream task and the socket writer.
const CHANNEL_DEPTH: usize = 8;

pub struct ChunkReader {
    chunks: Receiver<io::Result<Bytes>>,
    current: Bytes,
}

impl ChunkReader {
    /// Spawn a task on `handle` that pulls `response` chunk by chunk.
    ///
    /// The task stops early once the reader is dropped.
    pub fn spawn(handle: &Handle, response: reqwest::Response) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        handle.spawn(async move {
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(io::Error::other);
                let failed = chunk.is_err();
                if tx.send(chunk).await.is_err() || failed {
                    break;
                }
            }
        });
        Self {
            chunks: rx,
            current: Bytes::new(),
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.current.is_empty() {
            match self.chunks.blocking_recv() {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(e)) => return Err(e),
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.current.len());
        buf[..n].copy_from_slice(&self.current[..n]);
        self.current.advance(n);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reads_whole_body() {
        let body = vec![7u8; 100_000];
        let response = reqwest::Response::from(
            http::Response::builder().status(200).body(body.clone()).unwrap(),
        );
        let handle = Handle::current();
        let read = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            ChunkReader::spawn(&handle, response)
                .read_to_end(&mut out)
                .unwrap();
            out
        })
        .await
        .unwrap();
        assert_eq!(read.len(), body.len());
        assert_eq!(read, body);
    }
}
