//! Functions and types for decoding RESP values from a byte source.
//!
//! <https://redis.io/docs/reference/protocol-spec/>

use crate::{
  error::{RespError, RespErrorKind},
  types::*,
  utils,
};
use bytes::{Buf, Bytes, BytesMut};
use bytes_utils::Str;
use std::{
  cmp,
  io::{BufRead, BufReader, ErrorKind as IoErrorKind, Read},
};

/// The largest number of array elements or payload bytes allocated up front, before the data has arrived.
const PREALLOC_LIMIT: usize = 1024;

/// Limits applied while decoding input from untrusted peers.
///
/// Every limit defaults to `None`, which disables the check.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DecoderConfig {
  /// The maximum nesting depth of arrays. A top level array has a depth of 1.
  pub max_depth:     Option<usize>,
  /// The maximum length of a line, not including the CRLF.
  pub max_line_len:  Option<usize>,
  /// The maximum declared length of a bulk string.
  pub max_bulk_len:  Option<usize>,
  /// The maximum declared number of elements in an array.
  pub max_array_len: Option<usize>,
}

impl DecoderConfig {
  pub fn with_max_depth(mut self, depth: usize) -> Self {
    self.max_depth = Some(depth);
    self
  }

  pub fn with_max_line_len(mut self, len: usize) -> Self {
    self.max_line_len = Some(len);
    self
  }

  pub fn with_max_bulk_len(mut self, len: usize) -> Self {
    self.max_bulk_len = Some(len);
    self
  }

  pub fn with_max_array_len(mut self, len: usize) -> Self {
    self.max_array_len = Some(len);
    self
  }
}

fn check_limit(limit: Option<usize>, amt: usize, what: &'static str) -> Result<(), RespError> {
  match limit {
    Some(max) if amt > max => Err(RespError::new(
      RespErrorKind::LimitExceeded,
      format!("{} of {} exceeds the maximum of {}.", what, amt, max),
    )),
    _ => Ok(()),
  }
}

/// Read one byte from `reader`, returning `None` at the end of the stream.
fn read_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>, RespError> {
  loop {
    let byte = match reader.fill_buf() {
      Ok(buf) => match buf.first() {
        Some(b) => *b,
        None => return Ok(None),
      },
      Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
      Err(e) => return Err(e.into()),
    };
    reader.consume(1);

    return Ok(Some(byte));
  }
}

/// Read bytes until a CR immediately followed by a LF, returning the bytes before the CRLF and the number of bytes
/// consumed including the CRLF.
pub fn read_line<R: BufRead>(reader: &mut R, max_len: Option<usize>) -> Result<(Vec<u8>, usize), RespError> {
  let mut line = Vec::new();

  loop {
    let byte = match read_byte(reader)? {
      Some(b) => b,
      None => return Err(RespError::source_exhausted("Missing CRLF.")),
    };
    line.push(byte);

    if byte == b'\n' && line.len() >= 2 && line[line.len() - 2] == b'\r' {
      let consumed = line.len();
      line.truncate(consumed - 2);
      return Ok((line, consumed));
    }
    // the line may still end with a CR that is waiting on its LF
    check_limit(max_len, line.len().saturating_sub(1), "Line length")?;
  }
}

/// Read a line and parse it as a base-10 signed integer, returning the integer and the number of bytes consumed.
pub fn read_prefix_len<R: BufRead>(reader: &mut R, max_line_len: Option<usize>) -> Result<(i64, usize), RespError> {
  let (line, consumed) = read_line(reader, max_line_len)?;
  Ok((utils::parse_integer(&line)?, consumed))
}

/// An array whose elements are still being decoded.
struct PendingArray {
  expected: usize,
  values:   Vec<Value>,
}

impl PendingArray {
  fn new(expected: usize) -> Self {
    PendingArray {
      expected,
      values: Vec::with_capacity(cmp::min(expected, PREALLOC_LIMIT)),
    }
  }

  fn is_complete(&self) -> bool {
    self.values.len() >= self.expected
  }
}

enum Decoded {
  Value(Value),
  ArrayHeader(usize),
}

/// A decoder that reads one value at a time from a buffered byte source.
///
/// Each call to [decode_next](Self::decode_next) consumes exactly the bytes of one value, leaving the source at the
/// start of the next value. Nested arrays are decoded with an explicit stack rather than recursion.
///
/// ```rust
/// use resp_codec::{Decoder, Value};
///
/// let mut decoder = Decoder::new(&b"*2\r\n$3\r\nfoo\r\n:1\r\n+OK\r\n"[..]);
/// assert_eq!(
///   decoder.decode_next().unwrap(),
///   Value::Array(vec![Value::BulkString("foo".into()), Value::Integer(1)])
/// );
/// assert_eq!(decoder.decode_next().unwrap(), Value::SimpleString("OK".into()));
/// assert!(decoder.decode_next().unwrap_err().is_end_of_stream());
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
  reader:   R,
  config:   DecoderConfig,
  consumed: usize,
}

impl<R: Read> Decoder<BufReader<R>> {
  /// Create a decoder that buffers reads from `inner`.
  pub fn new(inner: R) -> Self {
    Decoder::from_buf_read(BufReader::new(inner))
  }

  /// Create a decoder that buffers reads from `inner` with a buffer of `capacity` bytes.
  pub fn with_capacity(capacity: usize, inner: R) -> Self {
    Decoder::from_buf_read(BufReader::with_capacity(capacity, inner))
  }
}

impl<R: BufRead> Decoder<R> {
  /// Create a decoder from a source that is already buffered.
  pub fn from_buf_read(reader: R) -> Self {
    Decoder {
      reader,
      config: DecoderConfig::default(),
      consumed: 0,
    }
  }

  /// Replace the decoder's limits.
  pub fn with_config(mut self, config: DecoderConfig) -> Self {
    self.config = config;
    self
  }

  pub fn config(&self) -> &DecoderConfig {
    &self.config
  }

  /// The total number of bytes consumed from the source by successful and failed calls.
  pub fn consumed(&self) -> usize {
    self.consumed
  }

  pub fn get_ref(&self) -> &R {
    &self.reader
  }

  pub fn get_mut(&mut self) -> &mut R {
    &mut self.reader
  }

  pub fn into_inner(self) -> R {
    self.reader
  }

  /// Decode the next value from the source.
  ///
  /// Returns an [EndOfStream](RespErrorKind::EndOfStream) error if the source ends before the first byte of a value.
  /// Any other error leaves the source at an indeterminate position.
  pub fn decode_next(&mut self) -> Result<Value, RespError> {
    let mut stack: Vec<PendingArray> = Vec::new();

    loop {
      let mut value = match self.decode_step(!stack.is_empty())? {
        Decoded::Value(value) => value,
        Decoded::ArrayHeader(len) => {
          if let Some(max) = self.config.max_depth {
            if stack.len() + 1 > max {
              return Err(RespError::new(
                RespErrorKind::DepthExceeded,
                format!("Arrays nested deeper than {}.", max),
              ));
            }
          }

          if len == 0 {
            Value::Array(Vec::new())
          } else {
            stack.push(PendingArray::new(len));
            continue;
          }
        },
      };

      loop {
        match stack.pop() {
          None => {
            decode_log!("Decoded {:?} value, consumed {}", value.kind(), self.consumed);
            return Ok(value);
          },
          Some(mut pending) => {
            pending.values.push(value);

            if pending.is_complete() {
              value = Value::Array(pending.values);
            } else {
              stack.push(pending);
              break;
            }
          },
        }
      }
    }
  }

  /// Read a scalar value, or the header of an array.
  fn decode_step(&mut self, nested: bool) -> Result<Decoded, RespError> {
    let tag = match read_byte(&mut self.reader)? {
      Some(b) => b,
      None if nested => return Err(RespError::source_exhausted("Missing array element.")),
      None => return Err(RespError::end_of_stream()),
    };
    self.consumed += 1;
    decode_log!("Decoding value with type byte {:?}", tag as char);

    match tag {
      SIMPLESTRING_BYTE => {
        let line = self.read_text_line()?;
        Ok(Decoded::Value(Value::SimpleString(Bytes::from(line))))
      },
      ERROR_BYTE => {
        let line = self.read_text_line()?;
        Ok(Decoded::Value(Value::Error(Str::from_inner(Bytes::from(line))?)))
      },
      INTEGER_BYTE => {
        let line = self.read_line()?;
        Ok(Decoded::Value(Value::Integer(utils::parse_integer(&line)?)))
      },
      BULKSTRING_BYTE => self.read_bulkstring().map(Decoded::Value),
      ARRAY_BYTE => self.read_array_header(),
      _ => Err(RespError::new(
        RespErrorKind::UnknownTypeTag,
        format!("Unknown type byte: {:#04x}", tag),
      )),
    }
  }

  fn read_line(&mut self) -> Result<Vec<u8>, RespError> {
    let (line, consumed) = read_line(&mut self.reader, self.config.max_line_len)?;
    self.consumed += consumed;
    decode_log!(line, "Read line: {:?}", line);

    Ok(line)
  }

  /// Read a simple string or error line, which cannot contain a bare CR or LF.
  fn read_text_line(&mut self) -> Result<Vec<u8>, RespError> {
    let line = self.read_line()?;
    utils::check_line(&line, RespErrorKind::Parse)?;

    Ok(line)
  }

  /// Read a length prefix, returning `None` for the null marker.
  fn read_len(&mut self, limit: Option<usize>, what: &'static str) -> Result<Option<usize>, RespError> {
    let line = self.read_line()?;
    let len = utils::parse_integer(&line)?;

    if len == NULL_LEN {
      return Ok(None);
    }
    if len < 0 {
      return Err(RespError::new(
        RespErrorKind::MalformedLength,
        format!("{} cannot be {}.", what, len),
      ));
    }
    let len = usize::try_from(len).map_err(|_| {
      RespError::new(
        RespErrorKind::LimitExceeded,
        format!("{} of {} does not fit in memory.", what, len),
      )
    })?;
    check_limit(limit, len, what)?;

    Ok(Some(len))
  }

  fn read_bulkstring(&mut self) -> Result<Value, RespError> {
    let len = match self.read_len(self.config.max_bulk_len, "Bulk string length")? {
      Some(len) => len,
      None => return Ok(Value::Null),
    };

    // grows as the payload arrives instead of trusting the declared length up front
    let mut payload = Vec::with_capacity(cmp::min(len, PREALLOC_LIMIT));
    let read = (&mut self.reader).take(len as u64).read_to_end(&mut payload)?;
    self.consumed += read;
    if read < len {
      return Err(RespError::source_exhausted(format!(
        "Expected {} bulk string bytes, found {}.",
        len, read
      )));
    }

    for expected in CRLF.bytes() {
      match read_byte(&mut self.reader)? {
        Some(b) if b == expected => self.consumed += 1,
        Some(b) => {
          return Err(RespError::new(
            RespErrorKind::UnderflowPayload,
            format!("Expected CRLF after {} bulk string bytes, found {:#04x}.", len, b),
          ))
        },
        None => return Err(RespError::source_exhausted("Missing CRLF after bulk string.")),
      }
    }

    Ok(Value::BulkString(Bytes::from(payload)))
  }

  fn read_array_header(&mut self) -> Result<Decoded, RespError> {
    match self.read_len(self.config.max_array_len, "Array length")? {
      Some(len) => Ok(Decoded::ArrayHeader(len)),
      None => Ok(Decoded::Value(Value::NullArray)),
    }
  }
}

impl<R: BufRead> Iterator for Decoder<R> {
  type Item = Result<Value, RespError>;

  /// Decode the next value, ending the iteration when the source ends cleanly between values.
  fn next(&mut self) -> Option<Self::Item> {
    match self.decode_next() {
      Err(e) if e.is_end_of_stream() => None,
      result => Some(result),
    }
  }
}

/// Attempt to decode the contents of `buf`, returning the first valid value and the number of bytes consumed.
///
/// If the buffer contains an incomplete value then `None` is returned.
pub fn decode(buf: &[u8]) -> Result<Option<(Value, usize)>, RespError> {
  decode_with_config(buf, &DecoderConfig::default())
}

/// Attempt to decode the contents of `buf` with the provided limits.
pub fn decode_with_config(buf: &[u8], config: &DecoderConfig) -> Result<Option<(Value, usize)>, RespError> {
  let mut decoder = Decoder::from_buf_read(buf).with_config(config.clone());

  match decoder.decode_next() {
    Ok(value) => Ok(Some((value, decoder.consumed()))),
    Err(e) if e.is_incomplete() => Ok(None),
    Err(e) => Err(e),
  }
}

/// Attempt to decode the contents of `buf`, splitting off the consumed bytes if a complete value is found.
pub fn decode_bytes_mut(buf: &mut BytesMut, config: &DecoderConfig) -> Result<Option<(Value, usize)>, RespError> {
  let (value, amt) = match decode_with_config(buf, config)? {
    Some(parsed) => parsed,
    None => return Ok(None),
  };
  buf.advance(amt);

  Ok(Some((value, amt)))
}
