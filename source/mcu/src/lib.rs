#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
pub use error::{Error, ErrorKind};

pub mod buffers;
pub mod channel;
pub mod filter;
pub mod hal;
pub mod tasks;

#[cfg(test)]
mod testing;

use alloc::sync::Arc;
use common::{
    config::{BANNER, CHANNEL_COUNT},
    values::ChannelId,
};
use hal::{Board, Peripherals};
use tasks::{Button, CommandParser, ControlHandle, Outbox, Sampler, Statistics, Supervisor, Transmitter};

/// Event handlers of the firmware.
///
/// The board glue calls them from the matching interrupts and calls `supervisor.poll()` from the
/// main loop. Handlers of the same event never run concurrently.
pub struct Handlers<B: Board> {
    /// Indexed by `ChannelId::index`.
    pub samplers: [Sampler<B>; CHANNEL_COUNT],
    pub commands: CommandParser,
    pub button: Button,
    pub transmitter: Transmitter<B::Uart>,
    pub supervisor: Supervisor<B>,
    pub control: Arc<ControlHandle>,
    pub stats: Arc<Statistics>,
}

impl<B: Board> Handlers<B> {
    pub fn sampler(&mut self, id: ChannelId) -> &mut Sampler<B> {
        &mut self.samplers[id.index()]
    }
}

/// Builds the handlers and queues the boot banner.
pub fn init<B: Board>(peripherals: Peripherals<B>) -> Handlers<B> {
    log::info!("Initializing firmware core");

    let Peripherals {
        adcs: [temp_adc, weight_adc],
        timers,
        uart,
        sample_led,
        run_led,
        clock,
        tx_waker,
    } = peripherals;

    let control = Arc::new(ControlHandle::new());
    let stats = Arc::new(Statistics::new());

    let outbox = |producer| Outbox::new(producer, tx_waker.clone(), stats.clone());
    let (console_prod, console_cons) = buffers::line_buffer();
    let (temp_prod, temp_cons) = buffers::line_buffer();
    let (weight_prod, weight_cons) = buffers::line_buffer();

    let mut console = outbox(console_prod);
    for line in BANNER {
        console.send(line.as_bytes());
    }

    let samplers: [Sampler<B>; CHANNEL_COUNT] = [
        Sampler::new(
            ChannelId::Temperature,
            temp_adc,
            Some(sample_led),
            control.clone(),
            outbox(temp_prod),
            stats.clone(),
        ),
        Sampler::new(
            ChannelId::Weight,
            weight_adc,
            None,
            control.clone(),
            outbox(weight_prod),
            stats.clone(),
        ),
    ];

    Handlers {
        samplers,
        commands: CommandParser::new(control.clone(), console, stats.clone()),
        button: Button::new(control.clone(), stats.clone()),
        transmitter: Transmitter::new(uart, [console_cons, temp_cons, weight_cons], stats.clone()),
        supervisor: Supervisor::new(timers, run_led, clock, control.clone(), stats.clone()),
        control,
        stats,
    }
}
