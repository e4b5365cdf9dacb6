use crate::{
  error::{RespError, RespErrorKind},
  types::{Value, NULL, NULL_ARRAY},
};
use bytes::BytesMut;
use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{digit0, one_of},
  combinator::{all_consuming, map_res, opt, recognize},
  sequence::tuple,
  IResult,
};
use std::str;

pub const KB: usize = 1024;
/// The `GenError::CustomError` code used when a simple string or error contains a CR or LF.
pub const LINE_BREAK_ERROR: u32 = 1;
/// A pre-defined zeroed out KB of data, used to speed up extending buffers while encoding.
pub const ZEROED_KB: &[u8; 1024] = &[0; 1024];

/// Returns the number of bytes necessary to encode a string representation of `d`.
pub fn digits_in_number(mut d: u64) -> usize {
  let mut digits = 1;
  while d >= 10 {
    d /= 10;
    digits += 1;
  }
  digits
}

// this is faster than repeat(0).take(amt) at the cost of some memory
pub fn zero_extend(buf: &mut BytesMut, mut amt: usize) {
  trace!("allocating more, len: {}, amt: {}", buf.len(), amt);

  buf.reserve(amt);
  while amt >= KB {
    buf.extend_from_slice(ZEROED_KB);
    amt -= KB;
  }
  if amt > 0 {
    buf.extend_from_slice(&ZEROED_KB[0 .. amt]);
  }
}

// zero, or an optionally negative number without leading zeros
fn signed_decimal(input: &[u8]) -> IResult<&[u8], i64> {
  let nonzero = recognize(tuple((opt(tag("-")), one_of("123456789"), digit0)));

  map_res(alt((tag("0"), nonzero)), |digits: &[u8]| {
    str::from_utf8(digits)
      .map_err(|_| ())
      .and_then(|s| s.parse::<i64>().map_err(|_| ()))
  })(input)
}

/// Parse a base-10 signed 64 bit integer that fills the entire slice.
pub fn parse_integer(buf: &[u8]) -> Result<i64, RespError> {
  match all_consuming(signed_decimal)(buf) {
    Ok((_, i)) => Ok(i),
    Err(_) => Err(RespError::new(
      RespErrorKind::MalformedLength,
      format!("Invalid integer: {:?}", String::from_utf8_lossy(buf)),
    )),
  }
}

pub fn has_line_break(data: &[u8]) -> bool {
  data.iter().any(|b| *b == b'\r' || *b == b'\n')
}

/// Check that a simple string or error payload can be terminated unambiguously by a CRLF.
pub fn check_line(data: &[u8], kind: RespErrorKind) -> Result<(), RespError> {
  if has_line_break(data) {
    Err(RespError::new(kind, "Simple strings and errors cannot contain CR or LF."))
  } else {
    Ok(())
  }
}

pub fn bulkstring_encode_len(b: &[u8]) -> usize {
  1 + digits_in_number(b.len() as u64) + 2 + b.len() + 2
}

pub fn simplestring_encode_len(s: &[u8]) -> usize {
  1 + s.len() + 2
}

pub fn error_encode_len(s: &str) -> usize {
  1 + s.len() + 2
}

pub fn integer_encode_len(i: i64) -> usize {
  let prefix = if i < 0 { 1 } else { 0 };

  1 + digits_in_number(i.unsigned_abs()) + 2 + prefix
}

pub fn array_encode_len(values: &[Value]) -> usize {
  values
    .iter()
    .fold(1 + digits_in_number(values.len() as u64) + 2, |len, value| {
      len + encode_len(value)
    })
}

/// Returns the number of bytes necessary to encode `value`.
pub fn encode_len(value: &Value) -> usize {
  match value {
    Value::SimpleString(s) => simplestring_encode_len(s),
    Value::Error(s) => error_encode_len(s),
    Value::Integer(i) => integer_encode_len(*i),
    Value::BulkString(b) => bulkstring_encode_len(b),
    Value::Array(values) => array_encode_len(values),
    Value::Null => NULL.len(),
    Value::NullArray => NULL_ARRAY.len(),
  }
}
