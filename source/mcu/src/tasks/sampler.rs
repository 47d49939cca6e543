use super::{control::ControlHandle, stats::Statistics, telemetry::Outbox};
use crate::{
    channel::Channel,
    error::ErrorKind,
    hal::{AdcIface, Board, PinIface},
};
use alloc::sync::Arc;
use common::{protocol::telemetry, values::ChannelId};

/// Acquisition of one channel, advanced by its timer and conversion events.
pub struct Sampler<B: Board> {
    channel: Channel,
    adc: B::Adc,
    /// Toggled on every reported sample.
    indicator: Option<B::Pin>,
    /// A conversion has been started and not read yet.
    pending: bool,
    control: Arc<ControlHandle>,
    outbox: Outbox,
    stats: Arc<Statistics>,
}

impl<B: Board> Sampler<B> {
    pub fn new(
        id: ChannelId,
        adc: B::Adc,
        indicator: Option<B::Pin>,
        control: Arc<ControlHandle>,
        outbox: Outbox,
        stats: Arc<Statistics>,
    ) -> Self {
        Self {
            channel: Channel::new(id),
            adc,
            indicator,
            pending: false,
            control,
            outbox,
            stats,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.channel.id()
    }
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn on_timer_elapsed(&mut self) {
        let stats = self.stats.channel(self.channel.id());
        if self.pending {
            stats.report_overrun();
            log::trace!("{}: conversion still pending, tick skipped", self.channel.id());
            return;
        }
        match self.adc.start() {
            Ok(()) => self.pending = true,
            Err(e) if e.kind == ErrorKind::Busy => stats.report_overrun(),
            Err(e) => {
                stats.report_adc_error();
                log::warn!("{}: cannot start conversion: {}", self.channel.id(), e);
            }
        }
    }

    pub fn on_conversion_complete(&mut self) {
        self.pending = false;
        let id = self.channel.id();
        let stats = self.stats.channel(id);
        let code = match self.adc.read() {
            Ok(code) => code,
            Err(e) => {
                stats.report_adc_error();
                log::warn!("{}: cannot read conversion: {}", id, e);
                return;
            }
        };

        let value = self.channel.sample(code, self.control.channel(id).filter());
        stats.report_sample(value);
        log::trace!("{}: code {} -> {}", id, code, value);

        self.outbox.send(&telemetry(id, value));
        if let Some(pin) = self.indicator.as_mut() {
            pin.toggle();
        }
    }
}
