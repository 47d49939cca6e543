use common::{config::CHANNEL_COUNT, values::ChannelId};
use core::{
    fmt::{self, Display, Formatter, Write},
    sync::atomic::{fence, AtomicU32, Ordering},
};
use indenter::indented;
use portable_atomic::AtomicU64;

#[derive(Default)]
pub struct Statistics {
    /// Number of button edges handled.
    button_edges: AtomicU64,
    /// Number of timer reload writes.
    reload_updates: AtomicU64,

    pub channels: [StatsChannel; CHANNEL_COUNT],
    pub tx: StatsTx,
    pub commands: StatsCommands,
}

#[derive(Default)]
pub struct StatsChannel {
    /// Number of completed and reported samples.
    samples: AtomicU64,
    /// Timer ticks skipped because a conversion was still pending.
    overruns: AtomicU64,
    adc_errors: AtomicU64,
    /// Bits of the last reported value.
    last_value: AtomicU32,
}

#[derive(Default)]
pub struct StatsTx {
    /// Lines dropped because the source queue was full.
    lines_dropped: AtomicU64,
    bytes_sent: AtomicU64,
    write_errors: AtomicU64,
}

#[derive(Default)]
pub struct StatsCommands {
    acknowledged: AtomicU64,
    /// Recognized commands whose value was out of range.
    rejected: AtomicU64,
    /// Commands with unrecognized type.
    unknown: AtomicU64,
    /// Lines discarded without acknowledgement.
    malformed: AtomicU64,
    /// Bytes dropped because the command line was full.
    overflow_bytes: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        let this = Self::default();
        this.reset();
        this
    }
    pub fn reset(&self) {
        fence(Ordering::Acquire);
        self.button_edges.store(0, Ordering::Relaxed);
        self.reload_updates.store(0, Ordering::Relaxed);
        fence(Ordering::Release);

        self.channels.iter().for_each(StatsChannel::reset);
        self.tx.reset();
        self.commands.reset();
    }

    pub fn channel(&self, id: ChannelId) -> &StatsChannel {
        &self.channels[id.index()]
    }

    pub fn report_button_edge(&self) {
        self.button_edges.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_reload_update(&self) {
        self.reload_updates.fetch_add(1, Ordering::AcqRel);
    }

    pub fn button_edges(&self) -> u64 {
        self.button_edges.load(Ordering::Acquire)
    }
    pub fn reload_updates(&self) -> u64 {
        self.reload_updates.load(Ordering::Acquire)
    }
}

impl StatsChannel {
    pub fn reset(&self) {
        fence(Ordering::Acquire);
        self.samples.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
        self.adc_errors.store(0, Ordering::Relaxed);
        self.last_value.store(0f32.to_bits(), Ordering::Relaxed);
        fence(Ordering::Release);
    }

    pub fn report_sample(&self, value: f32) {
        self.last_value.store(value.to_bits(), Ordering::Release);
        self.samples.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_adc_error(&self) {
        self.adc_errors.fetch_add(1, Ordering::AcqRel);
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Acquire)
    }
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Acquire)
    }
    pub fn adc_errors(&self) -> u64 {
        self.adc_errors.load(Ordering::Acquire)
    }
    pub fn last_value(&self) -> f32 {
        f32::from_bits(self.last_value.load(Ordering::Acquire))
    }
}

impl StatsTx {
    pub fn reset(&self) {
        fence(Ordering::Acquire);
        self.lines_dropped.store(0, Ordering::Relaxed);
        self.bytes_sent.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        fence(Ordering::Release);
    }

    pub fn report_line_dropped(&self) {
        self.lines_dropped.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_byte_sent(&self) {
        self.bytes_sent.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::AcqRel);
    }

    pub fn lines_dropped(&self) -> u64 {
        self.lines_dropped.load(Ordering::Acquire)
    }
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Acquire)
    }
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Acquire)
    }
}

impl StatsCommands {
    pub fn reset(&self) {
        fence(Ordering::Acquire);
        self.acknowledged.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.unknown.store(0, Ordering::Relaxed);
        self.malformed.store(0, Ordering::Relaxed);
        self.overflow_bytes.store(0, Ordering::Relaxed);
        fence(Ordering::Release);
    }

    pub fn report_acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_unknown(&self) {
        self.unknown.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::AcqRel);
    }
    pub fn report_overflow(&self) {
        self.overflow_bytes.fetch_add(1, Ordering::AcqRel);
    }

    pub fn acknowledged(&self) -> u64 {
        self.acknowledged.load(Ordering::Acquire)
    }
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Acquire)
    }
    pub fn unknown(&self) -> u64 {
        self.unknown.load(Ordering::Acquire)
    }
    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Acquire)
    }
    pub fn overflow_bytes(&self) -> u64 {
        self.overflow_bytes.load(Ordering::Acquire)
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fence(Ordering::Acquire);
        writeln!(f)?;

        writeln!(f, "button_edges: {}", self.button_edges.load(Ordering::Relaxed))?;
        writeln!(f, "reload_updates: {}", self.reload_updates.load(Ordering::Relaxed))?;

        for (id, channel) in ChannelId::ALL.iter().zip(&self.channels) {
            writeln!(f, "{}:", id)?;
            writeln!(indented(f).with_str("    "), "{}", channel)?;
        }

        writeln!(f, "tx:")?;
        writeln!(indented(f).with_str("    "), "{}", self.tx)?;

        writeln!(f, "commands:")?;
        writeln!(indented(f).with_str("    "), "{}", self.commands)?;

        Ok(())
    }
}

impl Display for StatsChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fence(Ordering::Acquire);
        writeln!(f, "samples: {}", self.samples.load(Ordering::Relaxed))?;
        writeln!(f, "overruns: {}", self.overruns.load(Ordering::Relaxed))?;
        writeln!(f, "adc_errors: {}", self.adc_errors.load(Ordering::Relaxed))?;
        let last = f32::from_bits(self.last_value.load(Ordering::Relaxed));
        writeln!(f, "last_value: {:.2}", last)?;
        Ok(())
    }
}

impl Display for StatsTx {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fence(Ordering::Acquire);
        writeln!(f, "lines_dropped: {}", self.lines_dropped.load(Ordering::Relaxed))?;
        writeln!(f, "bytes_sent: {}", self.bytes_sent.load(Ordering::Relaxed))?;
        writeln!(f, "write_errors: {}", self.write_errors.load(Ordering::Relaxed))?;
        Ok(())
    }
}

impl Display for StatsCommands {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fence(Ordering::Acquire);
        writeln!(f, "acknowledged: {}", self.acknowledged.load(Ordering::Relaxed))?;
        writeln!(f, "rejected: {}", self.rejected.load(Ordering::Relaxed))?;
        writeln!(f, "unknown: {}", self.unknown.load(Ordering::Relaxed))?;
        writeln!(f, "malformed: {}", self.malformed.load(Ordering::Relaxed))?;
        writeln!(f, "overflow_bytes: {}", self.overflow_bytes.load(Ordering::Relaxed))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_counters() {
        let stats = Statistics::new();
        stats.report_button_edge();
        stats.channel(ChannelId::Weight).report_sample(12.5);
        stats.tx.report_line_dropped();
        stats.commands.report_unknown();
        assert_eq!(stats.button_edges(), 1);
        assert_eq!(stats.channel(ChannelId::Weight).samples(), 1);
        assert_eq!(stats.channel(ChannelId::Weight).last_value(), 12.5);

        stats.reset();
        assert_eq!(stats.button_edges(), 0);
        assert_eq!(stats.channel(ChannelId::Weight).samples(), 0);
        assert_eq!(stats.tx.lines_dropped(), 0);
        assert_eq!(stats.commands.unknown(), 0);
    }

    #[test]
    fn display_is_nested() {
        let stats = Statistics::new();
        stats.channel(ChannelId::Temperature).report_sample(21.0);
        let text = stats.to_string();
        assert!(text.contains("temperature:\n    samples: 1\n"), "{}", text);
        assert!(text.contains("    last_value: 21.00\n"), "{}", text);
        assert!(text.contains("commands:\n    acknowledged: 0\n"), "{}", text);
        assert!(text.contains("tx:\n    lines_dropped: 0\n    bytes_sent: 0\n"), "{}", text);
        assert!(!text.contains("4:"), "{}", text);
    }
}
