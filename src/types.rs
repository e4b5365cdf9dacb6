use crate::{
  error::{RespError, RespErrorKind},
  utils,
};
use bytes::Bytes;
use bytes_utils::Str;
use std::{mem, str};

/// Terminating bytes between frames.
pub const CRLF: &str = "\r\n";

/// Byte prefix before a simple string type.
pub const SIMPLESTRING_BYTE: u8 = b'+';
/// Byte prefix before an error type.
pub const ERROR_BYTE: u8 = b'-';
/// Byte prefix before an integer type.
pub const INTEGER_BYTE: u8 = b':';
/// Byte prefix before a bulk string type.
pub const BULKSTRING_BYTE: u8 = b'$';
/// Byte prefix before an array type.
pub const ARRAY_BYTE: u8 = b'*';

/// The length or count used in place of a real one to denote a null value.
pub const NULL_LEN: i64 = -1;
/// The binary representation of a null bulk string.
pub const NULL: &str = "$-1\r\n";
/// The binary representation of a null array.
pub const NULL_ARRAY: &str = "*-1\r\n";

/// An enum representing the kind of a value without references to any inner data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
  SimpleString,
  Error,
  Integer,
  BulkString,
  Array,
  Null,
  NullArray,
}

impl ValueKind {
  /// Read the kind from a type byte. Null kinds share their byte with the non-null kind and are never returned.
  pub fn from_byte(d: u8) -> Option<ValueKind> {
    use self::ValueKind::*;

    match d {
      SIMPLESTRING_BYTE => Some(SimpleString),
      ERROR_BYTE => Some(Error),
      INTEGER_BYTE => Some(Integer),
      BULKSTRING_BYTE => Some(BulkString),
      ARRAY_BYTE => Some(Array),
      _ => None,
    }
  }

  pub fn to_byte(&self) -> u8 {
    use self::ValueKind::*;

    match *self {
      SimpleString => SIMPLESTRING_BYTE,
      Error => ERROR_BYTE,
      Integer => INTEGER_BYTE,
      BulkString | Null => BULKSTRING_BYTE,
      Array | NullArray => ARRAY_BYTE,
    }
  }
}

/// A single RESP value.
///
/// Null bulk strings and null arrays have their own variants so that they can never be confused with an empty
/// payload. `Value::BulkString(Bytes::new())` encodes as `$0\r\n\r\n` while `Value::Null` encodes as `$-1\r\n`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
  /// A short string without CR or LF bytes.
  SimpleString(Bytes),
  /// A short string representing an error.
  ///
  /// Error lines are decoded as UTF-8. A line with any other bytes fails with
  /// [Parse](crate::error::RespErrorKind::Parse).
  Error(Str),
  /// A signed 64 bit integer.
  Integer(i64),
  /// A binary-safe bulk string.
  BulkString(Bytes),
  /// An array of values.
  Array(Vec<Value>),
  /// A null bulk string.
  Null,
  /// A null array.
  NullArray,
}

impl Value {
  /// Replace `self` with Null, returning the original value.
  pub fn take(&mut self) -> Value {
    mem::replace(self, Value::Null)
  }

  /// Read the `ValueKind` value for this value.
  pub fn kind(&self) -> ValueKind {
    match *self {
      Value::SimpleString(_) => ValueKind::SimpleString,
      Value::Error(_) => ValueKind::Error,
      Value::Integer(_) => ValueKind::Integer,
      Value::BulkString(_) => ValueKind::BulkString,
      Value::Array(_) => ValueKind::Array,
      Value::Null => ValueKind::Null,
      Value::NullArray => ValueKind::NullArray,
    }
  }

  /// Whether or not the value is an error.
  pub fn is_error(&self) -> bool {
    matches!(self, Value::Error(_))
  }

  /// Whether or not the value is a null bulk string or a null array.
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null | Value::NullArray)
  }

  /// Whether or not the value is a simple string or bulk string.
  pub fn is_string(&self) -> bool {
    matches!(self, Value::SimpleString(_) | Value::BulkString(_))
  }

  /// Whether or not the value is a non-null array.
  pub fn is_array(&self) -> bool {
    matches!(self, Value::Array(_))
  }

  /// Whether or not the value is an integer.
  pub fn is_integer(&self) -> bool {
    matches!(self, Value::Integer(_))
  }

  /// Attempt to read the value as a string slice without allocating.
  pub fn as_str(&self) -> Option<&str> {
    match *self {
      Value::BulkString(ref b) | Value::SimpleString(ref b) => str::from_utf8(b).ok(),
      Value::Error(ref s) => Some(&**s),
      _ => None,
    }
  }

  /// Read the payload of a string or error value.
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match *self {
      Value::BulkString(ref b) | Value::SimpleString(ref b) => Some(&b[..]),
      Value::Error(ref s) => Some(s.as_bytes()),
      _ => None,
    }
  }

  /// Read the inner integer, parsing string payloads if necessary.
  pub fn as_i64(&self) -> Option<i64> {
    match *self {
      Value::Integer(i) => Some(i),
      Value::BulkString(ref b) | Value::SimpleString(ref b) => utils::parse_integer(b).ok(),
      _ => None,
    }
  }

  /// Copy and read the inner value as a string, if possible.
  pub fn to_string(&self) -> Option<String> {
    match *self {
      Value::BulkString(ref b) | Value::SimpleString(ref b) => String::from_utf8(b.to_vec()).ok(),
      Value::Error(ref s) => Some(String::from(&**s)),
      Value::Integer(i) => Some(i.to_string()),
      _ => None,
    }
  }

  /// Take the inner elements of an array.
  pub fn into_array(mut self) -> Option<Vec<Value>> {
    match self {
      Value::Array(ref mut values) => Some(mem::take(values)),
      _ => None,
    }
  }

  /// Read the number of bytes needed to encode this value.
  pub fn encode_len(&self) -> usize {
    utils::encode_len(self)
  }

  /// Create a simple string, failing if the payload contains a CR or LF byte.
  pub fn simple_string<B: Into<Bytes>>(data: B) -> Result<Value, RespError> {
    let data = data.into();
    utils::check_line(&data, RespErrorKind::EncodeError)?;
    Ok(Value::SimpleString(data))
  }

  /// Create an error, failing if the payload contains a CR or LF byte.
  pub fn error<S: Into<Str>>(data: S) -> Result<Value, RespError> {
    let data = data.into();
    utils::check_line(data.as_bytes(), RespErrorKind::EncodeError)?;
    Ok(Value::Error(data))
  }
}

// nested arrays are freed with an explicit stack so that deeply nested values cannot overflow the call stack
impl Drop for Value {
  fn drop(&mut self) {
    let mut pending = match self {
      Value::Array(values) if values.iter().any(Value::is_array) => mem::take(values),
      _ => return,
    };

    while let Some(mut value) = pending.pop() {
      if let Value::Array(ref mut values) = value {
        pending.append(values);
      }
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::BulkString(Bytes::copy_from_slice(s.as_bytes()))
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::BulkString(Bytes::from(s))
  }
}

impl From<&[u8]> for Value {
  fn from(b: &[u8]) -> Self {
    Value::BulkString(Bytes::copy_from_slice(b))
  }
}

impl From<Vec<u8>> for Value {
  fn from(v: Vec<u8>) -> Self {
    Value::BulkString(Bytes::from(v))
  }
}

impl From<Bytes> for Value {
  fn from(b: Bytes) -> Self {
    Value::BulkString(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Integer(i)
  }
}

impl From<Vec<Value>> for Value {
  fn from(values: Vec<Value>) -> Self {
    Value::Array(values)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(o: Option<T>) -> Self {
    match o {
      Some(v) => v.into(),
      None => Value::Null,
    }
  }
}
