//! Trait abstraction for serial byte input to enable testing

use async_trait::async_trait;
use std::io;

/// Source of received serial bytes
#[async_trait]
pub trait ByteSource: Send {
    /// Read available bytes into `buf`, waiting until at least one arrives
    ///
    /// Returns `Ok(0)` when the source is exhausted.
    async fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Mock byte source replaying scripted chunks
    pub struct MockByteSource {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl MockByteSource {
        pub fn new() -> Self {
            Self {
                chunks: VecDeque::new(),
            }
        }

        /// Queue a chunk returned by one read call
        pub fn push_chunk(&mut self, data: &[u8]) -> &mut Self {
            self.chunks.push_back(Ok(data.to_vec()));
            self
        }

        /// Queue a read error
        pub fn push_error(&mut self, kind: io::ErrorKind) -> &mut Self {
            self.chunks
                .push_back(Err(io::Error::new(kind, "Mock read error")));
            self
        }
    }

    #[async_trait]
    impl ByteSource for MockByteSource {
        async fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(mut data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n < data.len() {
                        self.chunks.push_front(Ok(data.split_off(n)));
                    }
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }
}
