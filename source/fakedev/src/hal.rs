use common::units::AdcCode;
use mcu::{
    hal::{AdcIface, Board, ClockIface, PinIface, TimerIface, TxWaker, UartIface},
    Error, ErrorKind,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU32, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc::UnboundedSender, Notify},
    time::Instant,
};

pub struct FakeBoard;

impl Board for FakeBoard {
    type Adc = FakeAdc;
    type Timer = FakeTimer;
    type Uart = FakeUart;
    type Pin = FakePin;
    type Clock = FakeClock;
}

#[derive(Default)]
struct InputState {
    queue: VecDeque<AdcCode>,
    hold: AdcCode,
}

/// Signal at the converter input.
///
/// Queued codes are converted one per conversion. When the queue is empty the last code is held.
#[derive(Default)]
pub struct AdcInput(Mutex<InputState>);

impl AdcInput {
    pub fn push(&self, code: AdcCode) {
        self.0.lock().unwrap().queue.push_back(code);
    }
    /// Drops queued codes and holds `code`.
    pub fn set(&self, code: AdcCode) {
        let mut state = self.0.lock().unwrap();
        state.queue.clear();
        state.hold = code;
    }
    pub fn queued(&self) -> usize {
        self.0.lock().unwrap().queue.len()
    }

    fn sample(&self) -> AdcCode {
        let mut state = self.0.lock().unwrap();
        if let Some(code) = state.queue.pop_front() {
            state.hold = code;
        }
        state.hold
    }
}

pub struct FakeAdc {
    input: Arc<AdcInput>,
    result: Option<AdcCode>,
    busy: bool,
    /// Notified when a conversion is started.
    started: Arc<Notify>,
}

impl FakeAdc {
    pub fn new(input: Arc<AdcInput>, started: Arc<Notify>) -> Self {
        Self {
            input,
            result: None,
            busy: false,
            started,
        }
    }
}

impl AdcIface for FakeAdc {
    fn start(&mut self) -> Result<(), Error> {
        if self.busy {
            return Err(Error::new(ErrorKind::Busy, "conversion in progress"));
        }
        self.busy = true;
        self.result = Some(self.input.sample());
        self.started.notify_one();
        Ok(())
    }
    fn read(&mut self) -> Result<AdcCode, Error> {
        self.busy = false;
        self.result
            .take()
            .ok_or(Error::new(ErrorKind::NotReady, "no conversion result"))
    }
}

/// Timer reload shared with the task emulating the timer.
#[derive(Clone, Default)]
pub struct FakeTimer(Arc<AtomicU32>);

impl FakeTimer {
    /// Time between elapsed events. `None` until the timer is programmed.
    pub fn period(&self) -> Option<Duration> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            ticks => Some(Duration::from_millis(ticks as u64)),
        }
    }
}

impl TimerIface for FakeTimer {
    fn reload(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
    fn set_reload(&mut self, ticks: u32) -> Result<(), Error> {
        self.0.store(ticks, Ordering::Release);
        Ok(())
    }
}

pub struct FakeUart(UnboundedSender<u8>);

impl FakeUart {
    pub fn new(sender: UnboundedSender<u8>) -> Self {
        Self(sender)
    }
}

impl UartIface for FakeUart {
    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.0
            .send(byte)
            .map_err(|_| Error::new(ErrorKind::Other, "serial port closed"))
    }
}

/// Output pin counting its toggles.
#[derive(Clone, Default)]
pub struct FakePin(Arc<AtomicUsize>);

impl FakePin {
    pub fn toggles(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

impl PinIface for FakePin {
    fn toggle(&mut self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

pub struct FakeClock {
    boot: Instant,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { boot: Instant::now() }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockIface for FakeClock {
    fn now(&self) -> Duration {
        self.boot.elapsed()
    }
}

pub struct NotifyWaker(pub Arc<Notify>);

impl TxWaker for NotifyWaker {
    fn wake(&self) {
        self.0.notify_one();
    }
}
