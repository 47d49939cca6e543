#[cfg(feature = "fake")]
extern crate std;

use derive_more::Display;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum ErrorKind {
    /// Peripheral is still processing a previous request.
    Busy,
    /// No completed result is available.
    NotReady,
    TimedOut,
    /// A result was lost before it was read.
    Overrun,
    Other,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
#[display(fmt = "{}: {}", kind, message)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: &'static str,
}

impl Error {
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, message: "" }
    }
}

#[cfg(feature = "fake")]
impl std::error::Error for Error {}
