use crate::config::{ADC_BITS, VREF};
use core::time::Duration;
use derive_more::Display;

/// Unit shared by both channels when interpreting their sampling periods.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum TimeUnit {
    #[display(fmt = "ms")]
    Millisecond = b'm',
    #[display(fmt = "s")]
    Second = b's',
    #[display(fmt = "min")]
    Minute = b'M',
}

impl TimeUnit {
    pub const ALL: [Self; 3] = [Self::Millisecond, Self::Second, Self::Minute];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'm' => Some(Self::Millisecond),
            b's' => Some(Self::Second),
            b'M' => Some(Self::Minute),
            _ => None,
        }
    }
    /// Character used for this unit on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
    /// Number of millisecond timer ticks in one unit.
    pub fn ticks(self) -> u32 {
        match self {
            Self::Millisecond => 1,
            Self::Second => 1_000,
            Self::Minute => 60_000,
        }
    }
    pub fn duration(self, magnitude: u32) -> Duration {
        Duration::from_millis(magnitude as u64 * self.ticks() as u64)
    }
}

/// Raw 12-bit conversion result.
#[repr(transparent)]
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Display)]
pub struct AdcCode(u16);

impl AdcCode {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self((1 << ADC_BITS) - 1);
    /// Volts per code.
    pub const STEP: f32 = VREF / Self::MAX.0 as f32;

    /// Keeps only the converter's resolution bits, as the data register does.
    pub fn new(raw: u16) -> Self {
        Self(raw & Self::MAX.0)
    }
    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn to_voltage(self) -> f32 {
        self.0 as f32 * VREF / Self::MAX.0 as f32
    }
    pub fn try_from_voltage(v: f32) -> Option<Self> {
        if (0.0..=VREF).contains(&v) {
            Some(Self::from_voltage_saturating(v))
        } else {
            None
        }
    }
    /// Nearest code to `v`, clamped to the converter range.
    pub fn from_voltage_saturating(v: f32) -> Self {
        let x = (v / Self::STEP + 0.5).clamp(Self::MIN.0 as f32, Self::MAX.0 as f32);
        Self(x as u16)
    }
}

impl From<AdcCode> for u16 {
    fn from(code: AdcCode) -> Self {
        code.0
    }
}
