use super::stats::Statistics;
use crate::{
    buffers::{LineConsumer, LineProducer},
    hal::{TxWaker, UartIface},
};
use alloc::sync::Arc;
use ringbuf::traits::*;

/// Console (banner and acknowledgements) followed by one queue per channel.
pub const SOURCE_COUNT: usize = 3;

/// Writing end of a source queue.
pub struct Outbox {
    producer: LineProducer,
    waker: Arc<dyn TxWaker>,
    stats: Arc<Statistics>,
}

impl Outbox {
    pub fn new(producer: LineProducer, waker: Arc<dyn TxWaker>, stats: Arc<Statistics>) -> Self {
        Self { producer, waker, stats }
    }

    /// Enqueues the whole line or nothing. Returns `false` if the line was dropped.
    pub fn send(&mut self, line: &[u8]) -> bool {
        if self.producer.vacant_len() < line.len() {
            self.stats.tx.report_line_dropped();
            log::warn!("Transmit queue is full, line dropped");
            return false;
        }
        self.producer.push_slice(line);
        self.waker.wake();
        true
    }
}

/// Moves queued lines to the UART, one byte per transmit-ready event.
///
/// A line is always finished before another source is served, so lines never interleave.
/// Sources are served round-robin so that a busy channel cannot starve the others.
pub struct Transmitter<U: UartIface> {
    uart: U,
    sources: [LineConsumer; SOURCE_COUNT],
    /// Source whose line is being sent.
    current: Option<usize>,
    /// Source to check first when selecting the next line.
    next: usize,
    stats: Arc<Statistics>,
}

impl<U: UartIface> Transmitter<U> {
    /// `sources` are ordered console first, then channels by `ChannelId::index`.
    pub fn new(uart: U, sources: [LineConsumer; SOURCE_COUNT], stats: Arc<Statistics>) -> Self {
        Self {
            uart,
            sources,
            current: None,
            next: 0,
            stats,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.sources.iter().all(|s| s.is_empty())
    }

    fn select(&mut self) -> Option<usize> {
        if let Some(index) = self.current {
            if !self.sources[index].is_empty() {
                return Some(index);
            }
        }
        (0..SOURCE_COUNT)
            .map(|i| (self.next + i) % SOURCE_COUNT)
            .find(|&i| !self.sources[i].is_empty())
    }

    /// Writes the next byte. Returns `true` while there is more to send.
    pub fn on_tx_ready(&mut self) -> bool {
        let index = match self.select() {
            Some(index) => index,
            None => {
                self.current = None;
                return false;
            }
        };
        if let Some(byte) = self.sources[index].try_pop() {
            if byte == b'\n' {
                self.current = None;
                self.next = (index + 1) % SOURCE_COUNT;
            } else {
                self.current = Some(index);
            }
            match self.uart.write_byte(byte) {
                Ok(()) => self.stats.tx.report_byte_sent(),
                Err(e) => {
                    self.stats.tx.report_write_error();
                    log::warn!("UART write failed: {}", e);
                }
            }
        }
        !self.is_idle()
    }
}
