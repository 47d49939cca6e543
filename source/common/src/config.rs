use crate::units::TimeUnit;
use core::time::Duration;

pub const CHANNEL_COUNT: usize = 2;

pub const ADC_BITS: u32 = 12;
pub const VREF: f32 = 3.3;

pub const TEMP_SCALE: f32 = 30.305;
pub const WEIGHT_SCALE: f32 = 303.03;

pub const MAX_SAMPLES: usize = 50;
pub const DEFAULT_WINDOW: usize = 10;

pub const DEFAULT_PERIOD: u32 = 1;
pub const DEFAULT_TIME_UNIT: TimeUnit = TimeUnit::Second;

/// Visible characters kept from a single command line.
pub const MAX_CMD_LEN: usize = 31;
/// Longest line the firmware transmits (`OK:` + command + `\r\n`).
pub const MAX_LINE_LEN: usize = 40;

/// Capacity of each transmit ring buffer in bytes.
pub const TX_BUFFER_LEN: usize = 256;

pub const INDICATOR_PERIOD: Duration = Duration::from_secs(1);
pub const STATS_PERIOD: Duration = Duration::from_secs(10);

pub const BAUD_RATE: u32 = 9600;
/// Start bit, 8 data bits, stop bit.
pub const BITS_PER_BYTE: u32 = 10;

pub const BANNER: [&str; 2] = ["System started\r\n", "Send 'a' to start, 'b' to stop\r\n"];
