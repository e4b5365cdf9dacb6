use rand::Rng;
use resp_codec::{Decoder, DecoderConfig, Encoder, RespErrorKind, Value};
use std::{
  io::{self, Read},
  net::{TcpListener, TcpStream},
  thread,
};

/// A reader that returns data in small, randomly sized chunks.
struct Chunked {
  data:   Vec<u8>,
  offset: usize,
}

impl Read for Chunked {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let remaining = self.data.len() - self.offset;
    if remaining == 0 || buf.is_empty() {
      return Ok(0);
    }
    let amt = rand::thread_rng().gen_range(1 ..= remaining.min(buf.len()).min(7));
    buf[.. amt].copy_from_slice(&self.data[self.offset .. self.offset + amt]);
    self.offset += amt;
    Ok(amt)
  }
}

fn command(args: &[&str]) -> Value {
  Value::Array(args.iter().map(|s| Value::from(*s)).collect())
}

#[test]
fn should_decode_pipelined_values_from_chunked_reader() {
  let _ = pretty_env_logger::try_init();
  let values = vec![
    command(&["SET", "foo", "bar"]),
    Value::SimpleString("OK".into()),
    Value::Error("ERR unknown command".into()),
    Value::Integer(-1),
    Value::Null,
    Value::NullArray,
    Value::Array(vec![Value::Array(vec![]), Value::BulkString("\r\n\0".into())]),
  ];

  let mut encoder = Encoder::new(Vec::new());
  for value in values.iter() {
    encoder.encode(value).unwrap();
  }
  let data = encoder.into_inner().unwrap();

  let decoder = Decoder::with_capacity(16, Chunked { data, offset: 0 });
  let decoded: Vec<Value> = decoder.collect::<Result<_, _>>().unwrap();
  assert_eq!(decoded, values);
}

#[test]
fn should_report_truncated_stream() {
  let _ = pretty_env_logger::try_init();
  let mut decoder = Decoder::new(Chunked {
    data:   b"*2\r\n$5\r\nhello\r\n$5\r\nwor".to_vec(),
    offset: 0,
  });

  let err = decoder.decode_next().unwrap_err();
  assert_eq!(err.kind(), &RespErrorKind::SourceExhausted);
  assert!(!err.is_end_of_stream());
}

#[test]
fn should_reject_untrusted_nesting() {
  let _ = pretty_env_logger::try_init();
  let data = "*1\r\n".repeat(64).into_bytes();
  let mut decoder = Decoder::new(&data[..]).with_config(DecoderConfig::default().with_max_depth(32));

  let err = decoder.decode_next().unwrap_err();
  assert_eq!(err.kind(), &RespErrorKind::DepthExceeded);
}

#[test]
fn should_exchange_values_over_tcp() {
  let _ = pretty_env_logger::try_init();
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();

  let server = thread::spawn(move || {
    let (socket, _) = listener.accept().unwrap();
    let decoder = Decoder::new(socket.try_clone().unwrap());
    let mut encoder = Encoder::new(socket);

    for request in decoder {
      let request = request.unwrap();
      let len = request.into_array().map(|args| args.len()).unwrap_or(0);
      encoder.encode(&Value::Integer(len as i64)).unwrap();
      encoder.flush().unwrap();
    }
  });

  let socket = TcpStream::connect(addr).unwrap();
  let mut decoder = Decoder::new(socket.try_clone().unwrap());
  let mut encoder = Encoder::new(socket);

  for args in [&["PING"][..], &["SET", "foo", "bar"][..], &["MGET", "a", "b", "c", "d"][..]] {
    encoder.encode(&command(args)).unwrap();
    encoder.flush().unwrap();
    assert_eq!(decoder.decode_next().unwrap(), Value::Integer(args.len() as i64));
  }

  drop(encoder);
  drop(decoder);
  server.join().unwrap();
}
