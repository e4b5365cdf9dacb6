use crate::{
  decode::{decode_bytes_mut, DecoderConfig},
  encode::extend_encode,
  error::RespError,
  types::Value,
};
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

/// Encode a redis command string (`SET foo bar NX`, etc) into a bulk string array.
pub fn resp_encode_command(cmd: &str) -> Value {
  Value::Array(
    cmd
      .split(' ')
      .filter(|s| !s.is_empty())
      .map(|s| Value::BulkString(s.as_bytes().to_vec().into()))
      .collect(),
  )
}

/// A framed RESP2 codec.
///
/// ```rust
/// use futures::{SinkExt, StreamExt};
/// use resp_codec::{
///   codec::{resp_encode_command, Resp},
///   Value,
/// };
/// use tokio::net::TcpStream;
/// use tokio_util::codec::Framed;
///
/// async fn example() {
///   let socket = TcpStream::connect("127.0.0.1:6379").await.unwrap();
///   let mut framed = Framed::new(socket, Resp::default());
///
///   let auth = resp_encode_command("AUTH foo bar");
///   let get_foo = resp_encode_command("GET foo");
///
///   let _ = framed.send(auth).await.unwrap();
///   let response = framed.next().await.unwrap().unwrap();
///   assert_eq!(response.as_str().unwrap(), "OK");
///
///   let _ = framed.send(get_foo).await.unwrap();
///   let response = framed.next().await.unwrap().unwrap();
///   assert_eq!(response, Value::Null);
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Resp {
  config: DecoderConfig,
}

impl Resp {
  /// Create a codec that applies `config` to every decoded value.
  pub fn new(config: DecoderConfig) -> Self {
    Resp { config }
  }

  pub fn config(&self) -> &DecoderConfig {
    &self.config
  }
}

impl Encoder<Value> for Resp {
  type Error = RespError;

  fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
    extend_encode(dst, &item).map(|_| ())
  }
}

impl Decoder for Resp {
  type Error = RespError;
  type Item = Value;

  fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
    if src.is_empty() {
      return Ok(None);
    }
    let parsed = match decode_bytes_mut(src, &self.config)? {
      Some((value, _)) => value,
      None => return Ok(None),
    };

    Ok(Some(parsed))
  }
}
