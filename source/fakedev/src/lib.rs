//! Emulation of the sensor board on the host.
//!
//! Each peripheral event source is a tokio task calling into the firmware handlers.

pub mod hal;

use common::{
    config::{BAUD_RATE, BITS_PER_BYTE, CHANNEL_COUNT},
    protocol::{Command, McuLine},
    units::AdcCode,
    values::ChannelId,
};
use hal::{AdcInput, FakeAdc, FakeBoard, FakeClock, FakePin, FakeTimer, FakeUart, NotifyWaker};
use mcu::{
    hal::Peripherals,
    tasks::{ControlHandle, Statistics},
    Handlers,
};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{
    sync::{
        mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
        Notify,
    },
    task::{spawn, JoinHandle},
    time::{sleep, Instant},
};

/// Time from conversion start to conversion complete.
pub const CONVERSION_TIME: Duration = Duration::from_micros(100);
/// Time to shift one byte through the serial line.
pub const BYTE_TIME: Duration = Duration::from_micros(1_000_000 * BITS_PER_BYTE as u64 / BAUD_RATE as u64);
/// Main loop iteration period.
pub const LOOP_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone)]
struct Shared(Arc<Mutex<Handlers<FakeBoard>>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Handlers<FakeBoard>> {
        self.0.lock().unwrap()
    }
}

/// Line received from the device.
#[derive(Clone, Debug)]
pub struct Line {
    /// Time the terminating byte arrived.
    pub time: Instant,
    pub text: String,
}

impl Line {
    pub fn parse(&self) -> McuLine<'_> {
        McuLine::parse(&self.text)
    }
}

/// Host side of the emulated board.
pub struct DeviceHandle {
    serial_tx: UnboundedSender<u8>,
    serial_rx: UnboundedReceiver<u8>,
    rx_line: Vec<u8>,

    adcs: [Arc<AdcInput>; CHANNEL_COUNT],
    timers: [FakeTimer; CHANNEL_COUNT],
    sample_led: FakePin,
    run_led: FakePin,

    handlers: Shared,
    control: Arc<ControlHandle>,
    stats: Arc<Statistics>,

    tasks: Vec<JoinHandle<()>>,
}

/// Boots the firmware and starts the peripheral tasks. Must be called inside a tokio runtime.
pub fn start() -> DeviceHandle {
    let adcs = [(); CHANNEL_COUNT].map(|()| Arc::new(AdcInput::default()));
    let started = [(); CHANNEL_COUNT].map(|()| Arc::new(Notify::new()));
    let timers = [(); CHANNEL_COUNT].map(|()| FakeTimer::default());
    let (sample_led, run_led) = (FakePin::default(), FakePin::default());
    let tx_ready = Arc::new(Notify::new());
    let (uart_tx, serial_rx) = unbounded_channel();
    let (serial_tx, uart_rx) = unbounded_channel();

    let mut index = 0;
    let fake_adcs = adcs.clone().map(|input| {
        let adc = FakeAdc::new(input, started[index].clone());
        index += 1;
        adc
    });
    let handlers = mcu::init::<FakeBoard>(Peripherals {
        adcs: fake_adcs,
        timers: timers.clone(),
        uart: FakeUart::new(uart_tx),
        sample_led: sample_led.clone(),
        run_led: run_led.clone(),
        clock: FakeClock::new(),
        tx_waker: Arc::new(NotifyWaker(tx_ready.clone())),
    });
    let (control, stats) = (handlers.control.clone(), handlers.stats.clone());
    let handlers = Shared(Arc::new(Mutex::new(handlers)));

    let mut tasks = vec![spawn(main_loop(handlers.clone()))];
    for (id, (timer, started)) in ChannelId::ALL.into_iter().zip(timers.clone().into_iter().zip(started)) {
        tasks.push(spawn(timer_task(handlers.clone(), id, timer)));
        tasks.push(spawn(adc_task(handlers.clone(), id, started)));
    }
    tasks.push(spawn(tx_task(handlers.clone(), tx_ready)));
    tasks.push(spawn(rx_task(handlers.clone(), uart_rx)));
    log::info!("Device started");

    DeviceHandle {
        serial_tx,
        serial_rx,
        rx_line: Vec::new(),
        adcs,
        timers,
        sample_led,
        run_led,
        handlers,
        control,
        stats,
        tasks,
    }
}

async fn main_loop(handlers: Shared) {
    loop {
        handlers.lock().supervisor.poll();
        sleep(LOOP_PERIOD).await;
    }
}

async fn timer_task(handlers: Shared, id: ChannelId, timer: FakeTimer) {
    loop {
        match timer.period() {
            Some(period) => {
                sleep(period).await;
                handlers.lock().sampler(id).on_timer_elapsed();
            }
            None => sleep(LOOP_PERIOD).await,
        }
    }
}

async fn adc_task(handlers: Shared, id: ChannelId, started: Arc<Notify>) {
    loop {
        started.notified().await;
        sleep(CONVERSION_TIME).await;
        handlers.lock().sampler(id).on_conversion_complete();
    }
}

async fn tx_task(handlers: Shared, tx_ready: Arc<Notify>) {
    loop {
        tx_ready.notified().await;
        loop {
            let more = handlers.lock().transmitter.on_tx_ready();
            sleep(BYTE_TIME).await;
            if !more {
                break;
            }
        }
    }
}

async fn rx_task(handlers: Shared, mut serial: UnboundedReceiver<u8>) {
    while let Some(byte) = serial.recv().await {
        sleep(BYTE_TIME).await;
        handlers.lock().commands.on_byte(byte);
    }
}

impl DeviceHandle {
    /// Sends raw bytes to the device.
    pub fn send(&self, text: &str) {
        for byte in text.bytes() {
            // The receiving task lives as long as the handle.
            let _ = self.serial_tx.send(byte);
        }
    }
    /// Sends `command` terminated by `\r`.
    pub fn send_command(&self, command: &Command) {
        self.send(&format!("{}\r", command));
    }

    /// Next line sent by the device, with terminator removed.
    pub async fn next_line(&mut self) -> Option<Line> {
        while let Some(byte) = self.serial_rx.recv().await {
            if byte == b'\n' {
                let bytes = std::mem::take(&mut self.rx_line);
                let text = String::from_utf8_lossy(&bytes).trim_end_matches('\r').to_string();
                return Some(Line {
                    time: Instant::now(),
                    text,
                });
            }
            self.rx_line.push(byte);
        }
        None
    }

    /// Drops bytes received but not read yet, including a partial line. Returns their number.
    pub fn discard_received(&mut self) -> usize {
        let mut count = self.rx_line.len();
        self.rx_line.clear();
        while self.serial_rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    /// Skips telemetry until an acknowledgement or other text arrives.
    pub async fn next_reply(&mut self) -> Option<Line> {
        while let Some(line) = self.next_line().await {
            if !matches!(line.parse(), McuLine::Reading { .. }) {
                return Some(line);
            }
        }
        None
    }

    /// Next reading of the `id` channel.
    pub async fn next_reading(&mut self, id: ChannelId) -> Option<(Instant, f32)> {
        while let Some(line) = self.next_line().await {
            if let McuLine::Reading { channel, value } = line.parse() {
                if channel == id {
                    return Some((line.time, value));
                }
            }
        }
        None
    }

    pub fn adc(&self, id: ChannelId) -> &AdcInput {
        &self.adcs[id.index()]
    }
    pub fn set_adc(&self, id: ChannelId, code: AdcCode) {
        self.adc(id).set(code);
    }

    /// Emulates a button edge.
    pub fn press_button(&self) {
        self.handlers.lock().button.on_edge();
    }

    /// Currently programmed timer period.
    pub fn timer_period(&self, id: ChannelId) -> Option<Duration> {
        self.timers[id.index()].period()
    }
    pub fn sample_led_toggles(&self) -> usize {
        self.sample_led.toggles()
    }
    pub fn run_led_toggles(&self) -> usize {
        self.run_led.toggles()
    }

    /// Filter state of the channel as `(index, window)`.
    pub fn filter_state(&self, id: ChannelId) -> (usize, usize) {
        let mut handlers = self.handlers.lock();
        let filter = handlers.sampler(id).channel().filter();
        (filter.index(), filter.window())
    }

    pub fn control(&self) -> &ControlHandle {
        &self.control
    }
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.tasks.iter().for_each(JoinHandle::abort);
    }
}
