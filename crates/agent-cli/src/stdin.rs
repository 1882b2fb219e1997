//! Line Input
//!
//! Reads user input one line at a time from any async buffered reader.

use agent_core::{InputSource, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-by-line input over an async reader
pub struct LineInput<R> {
    lines: Lines<R>,
}

/// Input from the process's standard input
pub type StdinInput = LineInput<BufReader<Stdin>>;

impl StdinInput {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> InputSource for LineInput<R> {
    /// Strips the line terminator; `None` once the reader hits EOF
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}
