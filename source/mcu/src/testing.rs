//! Peripherals recording what the handlers did with them.

use crate::{
    hal::{AdcIface, Board, ClockIface, PinIface, TimerIface, TxWaker, UartIface},
    Error, ErrorKind,
};
use common::units::AdcCode;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

pub struct TestBoard;

impl Board for TestBoard {
    type Adc = TestAdc;
    type Timer = TestTimer;
    type Uart = TestUart;
    type Pin = TestPin;
    type Clock = TestClock;
}

#[derive(Clone, Default)]
pub struct TestAdc {
    codes: Arc<Mutex<VecDeque<AdcCode>>>,
    starts: Arc<AtomicUsize>,
}

impl TestAdc {
    pub fn push(&self, code: AdcCode) {
        self.codes.lock().unwrap().push_back(code);
    }
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl AdcIface for TestAdc {
    fn start(&mut self) -> Result<(), Error> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn read(&mut self) -> Result<AdcCode, Error> {
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(Error::new(ErrorKind::NotReady, "no conversion result"))
    }
}

#[derive(Clone, Default)]
pub struct TestTimer(Arc<AtomicU32>);

impl TimerIface for TestTimer {
    fn reload(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
    fn set_reload(&mut self, ticks: u32) -> Result<(), Error> {
        self.0.store(ticks, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct TestUart {
    written: Arc<Mutex<Vec<u8>>>,
    fail: Arc<AtomicBool>,
}

impl TestUart {
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.written.lock().unwrap())
    }
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl UartIface for TestUart {
    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ErrorKind::Other.into());
        }
        self.written.lock().unwrap().push(byte);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct TestPin(Arc<AtomicUsize>);

impl TestPin {
    pub fn toggles(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl PinIface for TestPin {
    fn toggle(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct TestClock(Arc<Mutex<Duration>>);

impl TestClock {
    pub fn advance(&self, dt: Duration) {
        *self.0.lock().unwrap() += dt;
    }
}

impl ClockIface for TestClock {
    fn now(&self) -> Duration {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
pub struct CountWaker(AtomicUsize);

impl CountWaker {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl TxWaker for CountWaker {
    fn wake(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
