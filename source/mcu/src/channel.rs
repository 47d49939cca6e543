use crate::filter::MovingAverage;
use common::{
    units::AdcCode,
    values::{ChannelId, Reading},
};

/// Filter settings in effect for one sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FilterConfig {
    pub enabled: bool,
    pub window: usize,
}

/// Sample-side state of one sensor channel. Owned by that channel's sampler.
#[derive(Clone, Debug)]
pub struct Channel {
    id: ChannelId,
    reading: Reading,
    value: f32,
    filter: MovingAverage,
}

impl Channel {
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            reading: Reading::default(),
            value: 0.0,
            filter: MovingAverage::default(),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }
    /// Last unfiltered conversion.
    pub fn reading(&self) -> Reading {
        self.reading
    }
    /// Last reported value.
    pub fn value(&self) -> f32 {
        self.value
    }
    pub fn filter(&self) -> &MovingAverage {
        &self.filter
    }

    /// Converts `code` and returns the value to report.
    ///
    /// The filter buffer is only fed while the filter is enabled.
    pub fn sample(&mut self, code: AdcCode, config: FilterConfig) -> f32 {
        self.filter.set_window(config.window);
        self.reading = Reading::convert(self.id, code);
        self.value = if config.enabled {
            self.filter.push(self.reading.value)
        } else {
            self.reading.value
        };
        self.value
    }
}
