/// Destination for advisory warnings.
///
/// Advisories never change computed values; stages receive a sink so the
/// library can be exercised without process-wide logger state.
pub trait WarnSink {
    fn warn(&mut self, message: &str);
}

/// Forwards advisories to the process logger.
#[derive(Debug, Default)]
pub struct LogSink;

impl WarnSink for LogSink {
    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Collects advisories in memory for later inspection.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub messages: Vec<String>,
}

impl WarnSink for BufferSink {
    fn warn(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
