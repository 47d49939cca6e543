use crate::{
    config::{CHANNEL_COUNT, TEMP_SCALE, WEIGHT_SCALE},
    units::AdcCode,
};
use derive_more::Display;

/// Sensor channel. Telemetry tags are part of the wire format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ChannelId {
    #[display(fmt = "temperature")]
    Temperature,
    #[display(fmt = "weight")]
    Weight,
}

impl ChannelId {
    pub const ALL: [Self; CHANNEL_COUNT] = [Self::Temperature, Self::Weight];

    pub fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Weight => 1,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Temperature => "TEMP",
            Self::Weight => "PESO",
        }
    }
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ch| ch.tag() == tag)
    }

    /// Multiplicative calibration from volts to physical units.
    /// There is no offset term.
    pub fn scale(self) -> f32 {
        match self {
            Self::Temperature => TEMP_SCALE,
            Self::Weight => WEIGHT_SCALE,
        }
    }
}

/// Unfiltered result of a single conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    pub code: AdcCode,
    pub voltage: f32,
    pub value: f32,
}

impl Reading {
    pub fn convert(channel: ChannelId, code: AdcCode) -> Self {
        let voltage = code.to_voltage();
        Self {
            code,
            voltage,
            value: voltage * channel.scale(),
        }
    }
}
