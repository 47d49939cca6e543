use super::stats::Statistics;
use crate::channel::FilterConfig;
use alloc::sync::Arc;
use common::{
    config::{CHANNEL_COUNT, DEFAULT_PERIOD, DEFAULT_TIME_UNIT, DEFAULT_WINDOW},
    protocol::Command,
    units::TimeUnit,
    values::ChannelId,
};
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

/// Timer reload for a period of `magnitude` units. Never zero.
pub fn reload_ticks(magnitude: u32, unit: TimeUnit) -> u32 {
    magnitude.saturating_mul(unit.ticks()).max(1)
}

/// Channel settings written by the command parser and the button.
pub struct ChannelControl {
    /// Sampling period in `ControlHandle::time_unit` units.
    period: AtomicU32,
    filter_enabled: AtomicBool,
    filter_window: AtomicUsize,
}

/// State shared between event handlers and the main loop.
pub struct ControlHandle {
    /// Set by `a`, cleared by `b` and by the button.
    acquisition: AtomicBool,
    /// Code of the current `TimeUnit`.
    time_unit: AtomicU8,
    channels: [ChannelControl; CHANNEL_COUNT],
}

impl Default for ChannelControl {
    fn default() -> Self {
        Self {
            period: AtomicU32::new(DEFAULT_PERIOD),
            filter_enabled: AtomicBool::new(false),
            filter_window: AtomicUsize::new(DEFAULT_WINDOW),
        }
    }
}

impl ChannelControl {
    pub fn period(&self) -> u32 {
        self.period.load(Ordering::Acquire)
    }
    pub fn filter(&self) -> FilterConfig {
        FilterConfig {
            enabled: self.filter_enabled.load(Ordering::Acquire),
            window: self.filter_window.load(Ordering::Acquire),
        }
    }

    fn bump_period(&self) {
        let _ = self
            .period
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| Some(p.saturating_add(1)));
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlHandle {
    pub fn new() -> Self {
        Self {
            acquisition: AtomicBool::new(false),
            time_unit: AtomicU8::new(DEFAULT_TIME_UNIT.code()),
            channels: Default::default(),
        }
    }

    pub fn acquisition_active(&self) -> bool {
        self.acquisition.load(Ordering::Acquire)
    }
    pub fn set_acquisition(&self, active: bool) {
        if self.acquisition.swap(active, Ordering::AcqRel) != active {
            log::debug!("Acquisition {}", if active { "started" } else { "stopped" });
        }
    }

    pub fn time_unit(&self) -> TimeUnit {
        // Only valid codes are ever stored.
        TimeUnit::from_code(self.time_unit.load(Ordering::Acquire)).unwrap_or(DEFAULT_TIME_UNIT)
    }

    pub fn channel(&self, id: ChannelId) -> &ChannelControl {
        &self.channels[id.index()]
    }

    /// Current timer reload for the channel.
    pub fn reload(&self, id: ChannelId) -> u32 {
        reload_ticks(self.channel(id).period(), self.time_unit())
    }

    pub fn apply(&self, command: &Command) {
        match *command {
            Command::SetPeriod { channel, magnitude } => {
                self.channel(channel).period.store(magnitude, Ordering::Release);
            }
            Command::SetTimeUnit(unit) => {
                self.time_unit.store(unit.code(), Ordering::Release);
            }
            Command::SetFilter { channel, enabled } => {
                self.channel(channel).filter_enabled.store(enabled, Ordering::Release);
            }
            Command::SetWindow { channel, window } => {
                self.channel(channel).filter_window.store(window, Ordering::Release);
            }
        }
        log::debug!("Applied {}", command);
    }

    /// Stops acquisition and lengthens both periods by one unit.
    pub fn button_edge(&self) {
        self.set_acquisition(false);
        self.channels.iter().for_each(ChannelControl::bump_period);
    }
}

/// Handler of the button edge event.
pub struct Button {
    control: Arc<ControlHandle>,
    stats: Arc<Statistics>,
}

impl Button {
    pub fn new(control: Arc<ControlHandle>, stats: Arc<Statistics>) -> Self {
        Self { control, stats }
    }

    pub fn on_edge(&mut self) {
        self.stats.report_button_edge();
        self.control.button_edge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::MAX_SAMPLES;

    #[test]
    fn reload_values() {
        assert_eq!(reload_ticks(1, TimeUnit::Millisecond), 1);
        assert_eq!(reload_ticks(2, TimeUnit::Second), 2_000);
        assert_eq!(reload_ticks(3, TimeUnit::Minute), 180_000);
        assert_eq!(reload_ticks(0, TimeUnit::Second), 1);
        assert_eq!(reload_ticks(u32::MAX, TimeUnit::Minute), u32::MAX);
    }

    #[test]
    fn defaults() {
        let control = ControlHandle::new();
        assert!(!control.acquisition_active());
        assert_eq!(control.time_unit(), TimeUnit::Second);
        for id in ChannelId::ALL {
            assert_eq!(control.channel(id).period(), 1);
            assert_eq!(control.reload(id), 1_000);
            assert_eq!(
                control.channel(id).filter(),
                FilterConfig {
                    enabled: false,
                    window: DEFAULT_WINDOW
                }
            );
        }
    }

    #[test]
    fn apply_commands() {
        let control = ControlHandle::new();
        control.apply(&Command::SetPeriod {
            channel: ChannelId::Temperature,
            magnitude: 2,
        });
        control.apply(&Command::SetTimeUnit(TimeUnit::Millisecond));
        control.apply(&Command::SetFilter {
            channel: ChannelId::Weight,
            enabled: true,
        });
        control.apply(&Command::SetWindow {
            channel: ChannelId::Weight,
            window: MAX_SAMPLES,
        });

        assert_eq!(control.reload(ChannelId::Temperature), 2);
        assert_eq!(control.reload(ChannelId::Weight), 1);
        assert_eq!(
            control.channel(ChannelId::Weight).filter(),
            FilterConfig {
                enabled: true,
                window: MAX_SAMPLES
            }
        );
        assert!(!control.channel(ChannelId::Temperature).filter().enabled);
    }

    #[test]
    fn button_stops_and_lengthens() {
        let control = Arc::new(ControlHandle::new());
        let stats = Arc::new(Statistics::new());
        let mut button = Button::new(control.clone(), stats.clone());

        control.set_acquisition(true);
        button.on_edge();
        assert!(!control.acquisition_active());
        assert_eq!(control.channel(ChannelId::Temperature).period(), 2);
        assert_eq!(control.channel(ChannelId::Weight).period(), 2);

        button.on_edge();
        assert_eq!(control.channel(ChannelId::Weight).period(), 3);
        assert_eq!(stats.button_edges(), 2);
    }

    #[test]
    fn period_saturates() {
        let control = ControlHandle::new();
        control.apply(&Command::SetPeriod {
            channel: ChannelId::Temperature,
            magnitude: u32::MAX,
        });
        control.button_edge();
        assert_eq!(control.channel(ChannelId::Temperature).period(), u32::MAX);
    }
}
