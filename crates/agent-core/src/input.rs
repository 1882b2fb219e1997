//! User Input
//!
//! The loop pulls one line at a time from an [`InputSource`]. `None` means
//! the source is exhausted and the session should end.

use async_trait::async_trait;
use std::collections::VecDeque;

use crate::error::Result;

/// Producer of user input lines
#[async_trait]
pub trait InputSource: Send {
    /// Next line, or `None` at end of stream
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// Fixed list of lines, exhausted after the last one
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_input_ends() {
        let mut input = ScriptedInput::new(["one", "two"]);
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("two"));
        assert!(input.next_line().await.unwrap().is_none());
    }
}
