//! Functions and types for encoding values into the RESP protocol.
//!
//! <https://redis.io/docs/reference/protocol-spec/>

use crate::{
  error::RespError,
  types::*,
  utils::{self, LINE_BREAK_ERROR},
};
use bytes::BytesMut;
use cookie_factory::GenError;
use std::io::{BufWriter, Write};

fn check_line(data: &[u8]) -> Result<(), GenError> {
  if utils::has_line_break(data) {
    Err(GenError::CustomError(LINE_BREAK_ERROR))
  } else {
    Ok(())
  }
}

fn gen_simplestring<'a>(x: (&'a mut [u8], usize), data: &[u8]) -> Result<(&'a mut [u8], usize), GenError> {
  check_line(data)?;
  do_gen!(
    x,
    gen_be_u8!(SIMPLESTRING_BYTE) >> gen_slice!(data) >> gen_slice!(CRLF.as_bytes())
  )
}

fn gen_error<'a>(x: (&'a mut [u8], usize), data: &str) -> Result<(&'a mut [u8], usize), GenError> {
  check_line(data.as_bytes())?;
  do_gen!(
    x,
    gen_be_u8!(ERROR_BYTE) >> gen_slice!(data.as_bytes()) >> gen_slice!(CRLF.as_bytes())
  )
}

fn gen_integer(x: (&mut [u8], usize), data: i64) -> Result<(&mut [u8], usize), GenError> {
  do_gen!(
    x,
    gen_be_u8!(INTEGER_BYTE) >> gen_slice!(data.to_string().as_bytes()) >> gen_slice!(CRLF.as_bytes())
  )
}

fn gen_bulkstring<'a>(x: (&'a mut [u8], usize), data: &[u8]) -> Result<(&'a mut [u8], usize), GenError> {
  do_gen!(
    x,
    gen_be_u8!(BULKSTRING_BYTE)
      >> gen_slice!(data.len().to_string().as_bytes())
      >> gen_slice!(CRLF.as_bytes())
      >> gen_slice!(data)
      >> gen_slice!(CRLF.as_bytes())
  )
}

fn gen_null(x: (&mut [u8], usize)) -> Result<(&mut [u8], usize), GenError> {
  do_gen!(x, gen_slice!(NULL.as_bytes()))
}

fn gen_null_array(x: (&mut [u8], usize)) -> Result<(&mut [u8], usize), GenError> {
  do_gen!(x, gen_slice!(NULL_ARRAY.as_bytes()))
}

fn gen_array<'a>(x: (&'a mut [u8], usize), data: &[Value]) -> Result<(&'a mut [u8], usize), GenError> {
  let mut x = do_gen!(
    x,
    gen_be_u8!(ARRAY_BYTE) >> gen_slice!(data.len().to_string().as_bytes()) >> gen_slice!(CRLF.as_bytes())
  )?;

  for value in data.iter() {
    x = gen_value(x, value)?;
  }

  // the trailing CRLF is added by the last inner value
  Ok(x)
}

fn gen_value<'a>(x: (&'a mut [u8], usize), value: &Value) -> Result<(&'a mut [u8], usize), GenError> {
  match value {
    Value::SimpleString(s) => gen_simplestring(x, s),
    Value::Error(s) => gen_error(x, s),
    Value::Integer(i) => gen_integer(x, *i),
    Value::BulkString(b) => gen_bulkstring(x, b),
    Value::Array(values) => gen_array(x, values),
    Value::Null => gen_null(x),
    Value::NullArray => gen_null_array(x),
  }
}

fn gen_value_at(buf: &mut [u8], offset: usize, value: &Value) -> Result<usize, GenError> {
  gen_value((buf, offset), value).map(|(_, l)| l)
}

/// Attempt to encode a value into `buf`.
///
/// Simple strings and errors that contain a CR or LF byte fail with an `EncodeError`.
///
/// The caller is responsible for extending `buf` if a `BufferTooSmall` error is returned.
///
/// Returns the number of bytes encoded.
pub fn encode(buf: &mut [u8], value: &Value) -> Result<usize, RespError> {
  encode_checks!(buf, value.encode_len());
  gen_value_at(buf, 0, value).map_err(|e| e.into())
}

/// Attempt to encode a value at the end of `buf`, extending the buffer before encoding.
///
/// The buffer is restored to its original length if encoding fails.
///
/// Returns the number of bytes encoded.
pub fn extend_encode(buf: &mut BytesMut, value: &Value) -> Result<usize, RespError> {
  let amt = value.encode_len();
  let offset = buf.len();
  utils::zero_extend(buf, amt);

  match gen_value_at(buf, offset, value) {
    Ok(end) => Ok(end - offset),
    Err(e) => {
      buf.truncate(offset);
      Err(e.into())
    },
  }
}

/// An encoder that writes values to a buffered byte sink.
///
/// Values are written to the sink's buffer as they are encoded. Callers must call [flush](Self::flush) to push the
/// buffered bytes to the underlying writer.
///
/// ```rust
/// use resp_codec::{Encoder, Value};
///
/// let mut encoder = Encoder::new(Vec::new());
/// encoder.encode(&Value::Array(vec!["GET".into(), "foo".into()])).unwrap();
/// encoder.flush().unwrap();
///
/// assert_eq!(encoder.get_ref(), b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n");
/// ```
#[derive(Debug)]
pub struct Encoder<W: Write> {
  writer:  BufWriter<W>,
  scratch: BytesMut,
}

impl<W: Write> Encoder<W> {
  /// Create an encoder that buffers writes to `inner`.
  pub fn new(inner: W) -> Self {
    Encoder {
      writer:  BufWriter::new(inner),
      scratch: BytesMut::new(),
    }
  }

  /// Create an encoder that buffers writes to `inner` with a buffer of `capacity` bytes.
  pub fn with_capacity(capacity: usize, inner: W) -> Self {
    Encoder {
      writer:  BufWriter::with_capacity(capacity, inner),
      scratch: BytesMut::new(),
    }
  }

  /// Encode `value` and write it to the sink's buffer, returning the number of bytes written.
  pub fn encode(&mut self, value: &Value) -> Result<usize, RespError> {
    self.scratch.clear();
    let amt = extend_encode(&mut self.scratch, value)?;
    trace!("Writing {} encoded bytes", amt);
    self.writer.write_all(&self.scratch)?;

    Ok(amt)
  }

  /// Flush all buffered bytes to the underlying writer.
  pub fn flush(&mut self) -> Result<(), RespError> {
    self.writer.flush().map_err(|e| e.into())
  }

  pub fn get_ref(&self) -> &W {
    self.writer.get_ref()
  }

  pub fn get_mut(&mut self) -> &mut W {
    self.writer.get_mut()
  }

  /// Flush the buffer and return the underlying writer.
  pub fn into_inner(self) -> Result<W, RespError> {
    self.writer.into_inner().map_err(|e| e.into_error().into())
  }
}
