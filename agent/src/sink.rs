//! Observation sinks: where interceptors report what they saw.
//!
//! Line-oriented text only; one event renders to one line. A sink must
//! never destabilize the hooks feeding it, so write failures are logged
//! and swallowed.

use std::io;
use std::sync::Mutex;

use log::{info, warn};
use tapwire_protocol::ObservationEvent;

pub trait ObservationSink: Send + Sync {
    fn emit(&self, event: &ObservationEvent);
}

/// Routes observations through the `log` facade.
#[derive(Default)]
pub struct LogSink;

impl ObservationSink for LogSink {
    fn emit(&self, event: &ObservationEvent) {
        info!(target: "tapwire::observe", "{}", event.to_line());
    }
}

/// Writes one line per observation to any writer.
pub struct WriterSink<W: io::Write + Send> {
    writer: Mutex<W>,
}

impl<W: io::Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: io::Write + Send> ObservationSink for WriterSink<W> {
    fn emit(&self, event: &ObservationEvent) {
        let mut writer = self.writer.lock().unwrap();
        if let Err(e) = writeln!(writer, "{}", event.to_line()) {
            warn!("observation sink write failed: {}", e);
        }
    }
}

/// Collects observations in memory. Test-suite sink.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<ObservationEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<ObservationEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain all collected events.
    pub fn take(&self) -> Vec<ObservationEvent> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl ObservationSink for MemorySink {
    fn emit(&self, event: &ObservationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
