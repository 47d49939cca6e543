use crate::{
    config::{MAX_LINE_LEN, MAX_SAMPLES},
    units::TimeUnit,
    values::ChannelId,
};
use core::fmt::{self, Display, Formatter, Write};
use derive_more::Display;

/// Single-byte command that enables acquisition. Never enters the line buffer.
pub const START: u8 = b'a';
/// Single-byte command that disables acquisition.
pub const STOP: u8 = b'b';

pub const SEPARATOR: u8 = b':';
pub const ACK_PREFIX: &str = "OK";
pub const LINE_END: &str = "\r\n";

/// Bytes of a line the firmware is about to send.
pub type Line = heapless::Vec<u8, MAX_LINE_LEN>;

pub fn is_terminator(byte: u8) -> bool {
    matches!(byte, b'\r' | b'\n')
}

/// Command line split into its type code and textual value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Request<'a> {
    pub type_code: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> Request<'a> {
    /// Splits on the first `:`. Lines with an empty type code or value are rejected.
    pub fn tokenize(line: &'a [u8]) -> Option<Self> {
        let pos = line.iter().position(|&b| b == SEPARATOR)?;
        let (type_code, value) = (&line[..pos], &line[(pos + 1)..]);
        if type_code.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self { type_code, value })
    }

    pub fn int_value(&self) -> i32 {
        parse_int(self.value)
    }

    /// `OK:<type_code>:<value>\r\n`, echoing the received bytes.
    pub fn ack(&self) -> Line {
        let mut line = Line::new();
        let parts: [&[u8]; 6] = [
            ACK_PREFIX.as_bytes(),
            &[SEPARATOR],
            self.type_code,
            &[SEPARATOR],
            self.value,
            LINE_END.as_bytes(),
        ];
        for part in parts {
            // Cannot overflow: a request is at most `MAX_CMD_LEN` bytes long.
            let _ = line.extend_from_slice(part);
        }
        line
    }
}

/// Integer prefix of `text`.
///
/// Skips leading whitespace, accepts one optional sign and then as many decimal digits as follow.
/// Text without a leading number gives `0`. Out-of-range numbers saturate.
pub fn parse_int(text: &[u8]) -> i32 {
    let mut iter = text
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace() || *b == 0x0b)
        .peekable();
    let negative = match iter.peek() {
        Some(b'-') => {
            iter.next();
            true
        }
        Some(b'+') => {
            iter.next();
            false
        }
        _ => false,
    };
    let limit = i32::MAX as i64 + 1;
    let abs = iter
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| (acc * 10 + (b - b'0') as i64).min(limit));
    let value = if negative { -abs } else { abs };
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Validated command. Every variant carries an already-checked payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    SetPeriod { channel: ChannelId, magnitude: u32 },
    SetTimeUnit(TimeUnit),
    SetFilter { channel: ChannelId, enabled: bool },
    SetWindow { channel: ChannelId, window: usize },
}

/// Reason a tokenized request does not change any state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum DecodeError {
    #[display(fmt = "unknown command type")]
    UnknownType,
    #[display(fmt = "value out of range")]
    InvalidValue,
}

impl Command {
    pub fn decode(request: &Request<'_>) -> Result<Self, DecodeError> {
        use ChannelId::{Temperature, Weight};
        match request.type_code {
            b"T1" => Self::decode_period(Temperature, request),
            b"T2" => Self::decode_period(Weight, request),
            b"TU" => request
                .value
                .first()
                .and_then(|&c| TimeUnit::from_code(c))
                .map(Self::SetTimeUnit)
                .ok_or(DecodeError::InvalidValue),
            b"FT" => Ok(Self::decode_filter(Temperature, request)),
            b"FP" => Ok(Self::decode_filter(Weight, request)),
            b"ST" => Self::decode_window(Temperature, request),
            b"SP" => Self::decode_window(Weight, request),
            _ => Err(DecodeError::UnknownType),
        }
    }

    fn decode_period(channel: ChannelId, request: &Request<'_>) -> Result<Self, DecodeError> {
        match request.int_value() {
            x if x > 0 => Ok(Self::SetPeriod {
                channel,
                magnitude: x as u32,
            }),
            _ => Err(DecodeError::InvalidValue),
        }
    }
    fn decode_filter(channel: ChannelId, request: &Request<'_>) -> Self {
        Self::SetFilter {
            channel,
            enabled: request.int_value() != 0,
        }
    }
    fn decode_window(channel: ChannelId, request: &Request<'_>) -> Result<Self, DecodeError> {
        match request.int_value() {
            x if x >= 1 && x as usize <= MAX_SAMPLES => Ok(Self::SetWindow {
                channel,
                window: x as usize,
            }),
            _ => Err(DecodeError::InvalidValue),
        }
    }

    pub fn type_code(&self) -> &'static str {
        use ChannelId::{Temperature, Weight};
        match *self {
            Self::SetPeriod { channel: Temperature, .. } => "T1",
            Self::SetPeriod { channel: Weight, .. } => "T2",
            Self::SetTimeUnit(_) => "TU",
            Self::SetFilter { channel: Temperature, .. } => "FT",
            Self::SetFilter { channel: Weight, .. } => "FP",
            Self::SetWindow { channel: Temperature, .. } => "ST",
            Self::SetWindow { channel: Weight, .. } => "SP",
        }
    }
}

/// Wire form without the terminator, e.g. `T1:2` or `TU:s`.
impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.type_code())?;
        match *self {
            Self::SetPeriod { magnitude, .. } => write!(f, "{}", magnitude),
            Self::SetTimeUnit(unit) => f.write_char(unit.code() as char),
            Self::SetFilter { enabled, .. } => write!(f, "{}", enabled as u8),
            Self::SetWindow { window, .. } => write!(f, "{}", window),
        }
    }
}

/// Configuration a host sends right after opening the port.
pub const INITIAL_SETUP: [Command; 3] = [
    Command::SetTimeUnit(TimeUnit::Second),
    Command::SetPeriod {
        channel: ChannelId::Temperature,
        magnitude: 1,
    },
    Command::SetPeriod {
        channel: ChannelId::Weight,
        magnitude: 1,
    },
];

/// `<TAG>:<value with 2 decimals>\r\n`.
pub fn telemetry(channel: ChannelId, value: f32) -> Line {
    let mut text = heapless::String::<MAX_LINE_LEN>::new();
    // Longest possible reading is `PESO:` followed by a few integer digits.
    let _ = write!(text, "{}:{:.2}{}", channel.tag(), value, LINE_END);
    text.into_bytes()
}

/// Line received from the device, as classified by a host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum McuLine<'a> {
    Reading { channel: ChannelId, value: f32 },
    Ack { type_code: &'a str, value: &'a str },
    Text(&'a str),
}

impl<'a> McuLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if let Some((head, rest)) = line.split_once(':') {
            if let Some(channel) = ChannelId::from_tag(head) {
                if let Ok(value) = rest.trim().parse::<f32>() {
                    return Self::Reading { channel, value };
                }
            } else if head == ACK_PREFIX {
                if let Some((type_code, value)) = rest.split_once(':') {
                    return Self::Ack { type_code, value };
                }
            }
        }
        Self::Text(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(line: &str) -> Result<Command, DecodeError> {
        Command::decode(&Request::tokenize(line.as_bytes()).unwrap())
    }

    #[test]
    fn tokenize() {
        let req = Request::tokenize(b"T1:25").unwrap();
        assert_eq!(req.type_code, b"T1");
        assert_eq!(req.value, b"25");

        let req = Request::tokenize(b"XX:a:b").unwrap();
        assert_eq!(req.type_code, b"XX");
        assert_eq!(req.value, b"a:b");

        assert_eq!(Request::tokenize(b"T1"), None);
        assert_eq!(Request::tokenize(b"T1:"), None);
        assert_eq!(Request::tokenize(b":5"), None);
        assert_eq!(Request::tokenize(b":T1:5"), None);
        assert_eq!(Request::tokenize(b""), None);
    }

    #[test]
    fn integers() {
        assert_eq!(parse_int(b"42"), 42);
        assert_eq!(parse_int(b"  -7"), -7);
        assert_eq!(parse_int(b"+3x"), 3);
        assert_eq!(parse_int(b"12abc"), 12);
        assert_eq!(parse_int(b"abc"), 0);
        assert_eq!(parse_int(b"-"), 0);
        assert_eq!(parse_int(b"99999999999"), i32::MAX);
        assert_eq!(parse_int(b"-99999999999"), i32::MIN);
    }

    #[test]
    fn periods() {
        assert_eq!(
            decode("T1:5"),
            Ok(Command::SetPeriod {
                channel: ChannelId::Temperature,
                magnitude: 5
            })
        );
        assert_eq!(
            decode("T2:1"),
            Ok(Command::SetPeriod {
                channel: ChannelId::Weight,
                magnitude: 1
            })
        );
        assert_eq!(decode("T1:0"), Err(DecodeError::InvalidValue));
        assert_eq!(decode("T2:-4"), Err(DecodeError::InvalidValue));
        assert_eq!(decode("T1:x"), Err(DecodeError::InvalidValue));
    }

    #[test]
    fn time_units() {
        assert_eq!(decode("TU:m"), Ok(Command::SetTimeUnit(TimeUnit::Millisecond)));
        assert_eq!(decode("TU:s"), Ok(Command::SetTimeUnit(TimeUnit::Second)));
        assert_eq!(decode("TU:M"), Ok(Command::SetTimeUnit(TimeUnit::Minute)));
        assert_eq!(decode("TU:q"), Err(DecodeError::InvalidValue));
        assert_eq!(decode("TU:1"), Err(DecodeError::InvalidValue));
    }

    #[test]
    fn filters() {
        let off = Command::SetFilter {
            channel: ChannelId::Temperature,
            enabled: false,
        };
        assert_eq!(decode("FT:0"), Ok(off));
        assert_eq!(decode("FT:zero"), Ok(off));
        assert_eq!(
            decode("FP:-1"),
            Ok(Command::SetFilter {
                channel: ChannelId::Weight,
                enabled: true
            })
        );
    }

    #[test]
    fn windows() {
        assert_eq!(
            decode("ST:1"),
            Ok(Command::SetWindow {
                channel: ChannelId::Temperature,
                window: 1
            })
        );
        assert_eq!(
            decode("SP:50"),
            Ok(Command::SetWindow {
                channel: ChannelId::Weight,
                window: 50
            })
        );
        assert_eq!(decode("ST:0"), Err(DecodeError::InvalidValue));
        assert_eq!(decode("SP:51"), Err(DecodeError::InvalidValue));
    }

    #[test]
    fn unknown() {
        assert_eq!(decode("ZZ:1"), Err(DecodeError::UnknownType));
        assert_eq!(decode("t1:1"), Err(DecodeError::UnknownType));
    }

    #[test]
    fn wire_form() {
        for cmd in INITIAL_SETUP.into_iter().chain([
            Command::SetFilter {
                channel: ChannelId::Weight,
                enabled: true,
            },
            Command::SetWindow {
                channel: ChannelId::Temperature,
                window: 12,
            },
            Command::SetTimeUnit(TimeUnit::Minute),
        ]) {
            let text = cmd.to_string();
            assert_eq!(decode(&text), Ok(cmd), "{}", text);
        }
        assert_eq!(INITIAL_SETUP[0].to_string(), "TU:s");
    }

    #[test]
    fn ack() {
        let req = Request::tokenize(b"ST:99").unwrap();
        assert_eq!(req.ack().as_slice(), b"OK:ST:99\r\n");
    }

    #[test]
    fn telemetry_lines() {
        assert_eq!(telemetry(ChannelId::Temperature, 30.0).as_slice(), b"TEMP:30.00\r\n");
        assert_eq!(telemetry(ChannelId::Weight, 999.999).as_slice(), b"PESO:1000.00\r\n");
        assert_eq!(telemetry(ChannelId::Weight, 0.0).as_slice(), b"PESO:0.00\r\n");
    }

    #[test]
    fn host_lines() {
        assert_eq!(
            McuLine::parse("TEMP:21.50\r\n"),
            McuLine::Reading {
                channel: ChannelId::Temperature,
                value: 21.5
            }
        );
        assert_eq!(
            McuLine::parse("OK:T1:-3"),
            McuLine::Ack {
                type_code: "T1",
                value: "-3"
            }
        );
        assert_eq!(McuLine::parse("PESO:abc"), McuLine::Text("PESO:abc"));
        assert_eq!(McuLine::parse("System started\r\n"), McuLine::Text("System started"));
    }
}
