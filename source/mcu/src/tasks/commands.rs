use super::{control::ControlHandle, stats::Statistics, telemetry::Outbox};
use alloc::sync::Arc;
use common::{
    config::MAX_CMD_LEN,
    protocol::{is_terminator, Command, DecodeError, Request, START, STOP},
};

/// Accumulates received bytes into command lines and executes them.
pub struct CommandParser {
    line: heapless::Vec<u8, MAX_CMD_LEN>,
    control: Arc<ControlHandle>,
    outbox: Outbox,
    stats: Arc<Statistics>,
}

impl CommandParser {
    pub fn new(control: Arc<ControlHandle>, outbox: Outbox, stats: Arc<Statistics>) -> Self {
        Self {
            line: heapless::Vec::new(),
            control,
            outbox,
            stats,
        }
    }

    /// Bytes received since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.line
    }

    pub fn on_byte(&mut self, byte: u8) {
        match byte {
            START => self.control.set_acquisition(true),
            STOP => self.control.set_acquisition(false),
            b if is_terminator(b) => {
                if !self.line.is_empty() {
                    self.dispatch();
                    self.line.clear();
                }
            }
            b => {
                if self.line.push(b).is_err() {
                    self.stats.commands.report_overflow();
                }
            }
        }
    }

    fn dispatch(&mut self) {
        let stats = &self.stats.commands;
        let request = match Request::tokenize(&self.line) {
            Some(request) => request,
            None => {
                stats.report_malformed();
                log::debug!("Malformed command discarded: {:?}", Text(&self.line));
                return;
            }
        };

        match Command::decode(&request) {
            Ok(command) => self.control.apply(&command),
            Err(e) => {
                match e {
                    DecodeError::UnknownType => stats.report_unknown(),
                    DecodeError::InvalidValue => stats.report_rejected(),
                }
                log::debug!("Command {:?} not applied: {}", Text(&self.line), e);
            }
        }

        // Acknowledged even if nothing was applied.
        if self.outbox.send(&request.ack()) {
            stats.report_acknowledged();
        }
    }
}

/// Received bytes printed as text where possible.
struct Text<'a>(&'a [u8]);

impl<'a> core::fmt::Debug for Text<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match core::str::from_utf8(self.0) {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}
