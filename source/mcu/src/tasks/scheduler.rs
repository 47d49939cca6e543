use super::{control::ControlHandle, stats::Statistics};
use crate::hal::{Board, ClockIface, PinIface, TimerIface};
use alloc::sync::Arc;
use common::{
    config::{CHANNEL_COUNT, INDICATOR_PERIOD, STATS_PERIOD},
    values::ChannelId,
};
use core::time::Duration;

/// Foreground work done on every main loop iteration.
pub struct Supervisor<B: Board> {
    timers: [B::Timer; CHANNEL_COUNT],
    run_led: B::Pin,
    clock: B::Clock,
    control: Arc<ControlHandle>,
    stats: Arc<Statistics>,
    last_toggle: Duration,
    last_stats: Duration,
}

impl<B: Board> Supervisor<B> {
    pub fn new(
        timers: [B::Timer; CHANNEL_COUNT],
        run_led: B::Pin,
        clock: B::Clock,
        control: Arc<ControlHandle>,
        stats: Arc<Statistics>,
    ) -> Self {
        let now = clock.now();
        Self {
            timers,
            run_led,
            clock,
            control,
            stats,
            last_toggle: now,
            last_stats: now,
        }
    }

    pub fn poll(&mut self) {
        self.update_reloads();

        let now = self.clock.now();
        if self.control.acquisition_active() {
            if now.saturating_sub(self.last_toggle) >= INDICATOR_PERIOD {
                self.run_led.toggle();
                self.last_toggle = now;
            }
        } else {
            self.last_toggle = now;
        }

        if now.saturating_sub(self.last_stats) >= STATS_PERIOD {
            log::debug!("[Statistics]{}", self.stats);
            self.last_stats = now;
        }
    }

    fn update_reloads(&mut self) {
        for (id, timer) in ChannelId::ALL.into_iter().zip(self.timers.iter_mut()) {
            let reload = self.control.reload(id);
            if timer.reload() == reload {
                continue;
            }
            match timer.set_reload(reload) {
                Ok(()) => {
                    self.stats.report_reload_update();
                    log::debug!("{} period: {} ms", id, reload);
                }
                Err(e) => log::warn!("{}: cannot set timer reload: {}", id, e),
            }
        }
    }
}
