//! Capabilities the firmware core needs from the board.
//!
//! Register-level bring-up and interrupt vector registration live outside of this crate.
//! The board glue implements these traits and forwards each interrupt to the matching handler.

use crate::Error;
use alloc::sync::Arc;
use common::{config::CHANNEL_COUNT, units::AdcCode};
use core::time::Duration;

/// Analog converter bound to a single channel.
pub trait AdcIface: Send {
    /// Triggers a conversion. Completion is reported by a separate event.
    fn start(&mut self) -> Result<(), Error>;
    /// Result of the last completed conversion.
    fn read(&mut self) -> Result<AdcCode, Error>;
}

/// Periodic timer counting millisecond ticks.
pub trait TimerIface: Send {
    fn reload(&self) -> u32;
    fn set_reload(&mut self, ticks: u32) -> Result<(), Error>;
}

pub trait UartIface: Send {
    /// Called only after the peripheral reported that it is ready to accept a byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), Error>;
}

pub trait PinIface: Send {
    fn toggle(&mut self);
}

/// Monotonic time since boot.
pub trait ClockIface: Send {
    fn now(&self) -> Duration;
}

/// Requests transmit-ready events until the transmitter reports that it is drained.
pub trait TxWaker: Send + Sync {
    fn wake(&self);
}

pub trait Board: 'static {
    type Adc: AdcIface;
    type Timer: TimerIface;
    type Uart: UartIface;
    type Pin: PinIface;
    type Clock: ClockIface;
}

/// Peripherals handed over once bring-up is done. Arrays are indexed by `ChannelId::index`.
pub struct Peripherals<B: Board> {
    pub adcs: [B::Adc; CHANNEL_COUNT],
    pub timers: [B::Timer; CHANNEL_COUNT],
    pub uart: B::Uart,
    /// Toggled on every temperature sample.
    pub sample_led: B::Pin,
    /// Blinks while acquisition is active.
    pub run_led: B::Pin,
    pub clock: B::Clock,
    pub tx_waker: Arc<dyn TxWaker>,
}
