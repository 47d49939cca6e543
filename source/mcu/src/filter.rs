use common::config::{DEFAULT_WINDOW, MAX_SAMPLES};

/// Mean of the first `window` entries of `buffer`.
pub fn average(buffer: &[f32], window: usize) -> f32 {
    let window = window.min(buffer.len());
    if window == 0 {
        return 0.0;
    }
    buffer[..window].iter().sum::<f32>() / window as f32
}

/// Moving average over a circular buffer of fixed capacity.
///
/// Every slot inside the window contributes to the mean, including slots not yet written since
/// the filter was created (they hold zero). Shrinking the window wraps the write index into the
/// new window and keeps the buffer contents, so slots written under the old window stay in the
/// mean until they are overwritten.
#[derive(Clone, Debug)]
pub struct MovingAverage {
    buffer: [f32; MAX_SAMPLES],
    index: usize,
    window: usize,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            buffer: [0.0; MAX_SAMPLES],
            index: 0,
            window: window.clamp(1, MAX_SAMPLES),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    pub fn set_window(&mut self, window: usize) {
        let window = window.clamp(1, MAX_SAMPLES);
        if window != self.window {
            self.window = window;
            self.index %= window;
        }
    }

    /// Stores `value` at the write index and returns the new mean.
    pub fn push(&mut self, value: f32) -> f32 {
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % self.window;
        self.mean()
    }

    pub fn mean(&self) -> f32 {
        average(&self.buffer, self.window)
    }
}
