use crate::domain::order::OrderConfirmation;
use crate::error::Result;
use std::io::Write;

/// Writes order confirmations as pretty-printed JSON.
pub struct OrderWriter<W: Write> {
    writer: W,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_confirmation(&mut self, confirmation: &OrderConfirmation) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, confirmation)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
