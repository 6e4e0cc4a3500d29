use std::io::BufRead;

use tracing::info;

use crate::error::{Result, StudioError};

/// Source of a spoken idea. Returns `None` when nothing was heard.
pub trait SpeechInput {
    fn listen(&mut self) -> Result<Option<String>>;
}

/// Takes one dictated line from a reader, usually stdin fed by an external
/// dictation tool.
pub struct LineDictation<R> {
    reader: R,
}

impl<R: BufRead> LineDictation<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> SpeechInput for LineDictation<R> {
    fn listen(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| StudioError::SpeechError(e.to_string()))?;

        let transcript = line.trim();
        if transcript.is_empty() {
            return Ok(None);
        }

        info!("Heard {} characters of dictation", transcript.len());
        Ok(Some(transcript.to_string()))
    }
}
