use crate::utils::LINE_BREAK_ERROR;
use bytes_utils::string::Utf8Error as BytesUtf8Error;
use cookie_factory::GenError;
use std::{
  borrow::{Borrow, Cow},
  error::Error,
  fmt,
  io::{Error as IoError, ErrorKind as IoErrorKind},
  str::Utf8Error,
};

/// The kind of error without any associated data.
#[derive(Debug)]
pub enum RespErrorKind {
  /// The byte source ended cleanly before the type byte of a new value.
  EndOfStream,
  /// The byte source ended in the middle of a value.
  SourceExhausted,
  /// A length prefix, count, or integer value could not be parsed, or was below the null marker.
  MalformedLength,
  /// A type byte outside of `+`, `-`, `:`, `$` and `*`.
  UnknownTypeTag,
  /// The bytes following a bulk string payload of the declared length were not a CRLF.
  UnderflowPayload,
  /// Arrays were nested deeper than the decoder allows.
  DepthExceeded,
  /// A line, bulk string length, or array count was above the decoder's configured maximum.
  LimitExceeded,
  /// An error converting a payload between types, such as an error line that is not UTF-8.
  Parse,
  /// An error that occurred while encoding data.
  EncodeError,
  /// An error indicating that the provided buffer needs to be extended by the inner `usize` bytes before encoding
  /// can continue.
  BufferTooSmall(usize),
  /// An error reported by the underlying byte source or sink.
  IO(IoError),
  /// An unknown error.
  Unknown,
}

impl PartialEq for RespErrorKind {
  fn eq(&self, other: &Self) -> bool {
    use self::RespErrorKind::*;

    match *self {
      EndOfStream => matches!(other, EndOfStream),
      SourceExhausted => matches!(other, SourceExhausted),
      MalformedLength => matches!(other, MalformedLength),
      UnknownTypeTag => matches!(other, UnknownTypeTag),
      UnderflowPayload => matches!(other, UnderflowPayload),
      DepthExceeded => matches!(other, DepthExceeded),
      LimitExceeded => matches!(other, LimitExceeded),
      Parse => matches!(other, Parse),
      EncodeError => matches!(other, EncodeError),
      BufferTooSmall(amt) => match other {
        BufferTooSmall(_amt) => amt == *_amt,
        _ => false,
      },
      IO(_) => matches!(other, IO(_)),
      Unknown => matches!(other, Unknown),
    }
  }
}

impl Eq for RespErrorKind {}

impl RespErrorKind {
  pub fn to_str(&self) -> &'static str {
    use self::RespErrorKind::*;

    match *self {
      EndOfStream => "End of stream",
      SourceExhausted => "Source exhausted",
      MalformedLength => "Malformed length",
      UnknownTypeTag => "Unknown type tag",
      UnderflowPayload => "Underflow payload",
      DepthExceeded => "Depth exceeded",
      LimitExceeded => "Limit exceeded",
      Parse => "Parse Error",
      EncodeError => "Encode Error",
      BufferTooSmall(_) => "Buffer too small",
      IO(_) => "IO Error",
      Unknown => "Unknown Error",
    }
  }
}

/// The error type used with all external functions in this library.
///
/// Every decoding error other than [EndOfStream](RespErrorKind::EndOfStream) leaves the byte source at an
/// indeterminate position. Callers should close or reset the connection rather than decode again.
#[derive(Debug, Eq, PartialEq)]
pub struct RespError {
  details: Cow<'static, str>,
  kind:    RespErrorKind,
}

impl RespError {
  pub fn new<S: Into<Cow<'static, str>>>(kind: RespErrorKind, desc: S) -> Self {
    RespError {
      kind,
      details: desc.into(),
    }
  }

  pub fn buffer_too_small(amt: usize) -> Self {
    RespError::new(RespErrorKind::BufferTooSmall(amt), "")
  }

  pub(crate) fn end_of_stream() -> Self {
    RespError::new(RespErrorKind::EndOfStream, "")
  }

  pub(crate) fn source_exhausted<S: Into<Cow<'static, str>>>(desc: S) -> Self {
    RespError::new(RespErrorKind::SourceExhausted, desc)
  }

  pub fn new_empty() -> Self {
    RespError {
      kind:    RespErrorKind::Unknown,
      details: "".into(),
    }
  }

  pub fn details(&self) -> &str {
    self.details.borrow()
  }

  pub fn kind(&self) -> &RespErrorKind {
    &self.kind
  }

  /// Whether the byte source ended cleanly between two values.
  pub fn is_end_of_stream(&self) -> bool {
    matches!(self.kind, RespErrorKind::EndOfStream)
  }

  /// Whether the error only indicates that more bytes are needed, either between or inside a value.
  pub fn is_incomplete(&self) -> bool {
    matches!(self.kind, RespErrorKind::EndOfStream | RespErrorKind::SourceExhausted)
  }
}

impl fmt::Display for RespError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}: {}", self.kind.to_str(), self.details)
  }
}

impl Error for RespError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self.kind {
      RespErrorKind::IO(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<GenError> for RespError {
  fn from(e: GenError) -> Self {
    match e {
      GenError::CustomError(LINE_BREAK_ERROR) => RespError::new(
        RespErrorKind::EncodeError,
        "Simple strings and errors cannot contain CR or LF.",
      ),
      GenError::CustomError(i) => RespError::new(RespErrorKind::EncodeError, format!("Custom error: {}", i)),
      GenError::InvalidOffset => RespError::new(RespErrorKind::EncodeError, "Invalid offset."),
      GenError::BufferTooSmall(b) => RespError::buffer_too_small(b),
      _ => RespError::new_empty(),
    }
  }
}

impl From<IoError> for RespError {
  fn from(e: IoError) -> Self {
    if e.kind() == IoErrorKind::UnexpectedEof {
      RespError::source_exhausted(format!("{}", e))
    } else {
      RespError::new(RespErrorKind::IO(e), "IO Error")
    }
  }
}

impl From<Utf8Error> for RespError {
  fn from(e: Utf8Error) -> Self {
    RespError::new(RespErrorKind::Parse, format!("{}", e))
  }
}

impl<B> From<BytesUtf8Error<B>> for RespError {
  fn from(e: BytesUtf8Error<B>) -> Self {
    e.utf8_error().into()
  }
}
