use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use rand::{distributions::Alphanumeric, Rng};
use resp_codec::{
  codec::{resp_encode_command, Resp},
  DecoderConfig,
  RespErrorKind,
  Value,
  ValueKind,
};
use tokio::io::{duplex, DuplexStream};
use tokio_util::codec::{BytesCodec, Decoder, Framed};

fn framed_pair() -> (Framed<DuplexStream, Resp>, Framed<DuplexStream, Resp>) {
  let (client, server) = duplex(64);
  (Framed::new(client, Resp::default()), Framed::new(server, Resp::default()))
}

fn random_string(len: usize) -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(len)
    .map(char::from)
    .collect()
}

fn random_value(depth: usize) -> Value {
  let mut rng = rand::thread_rng();
  let max = if depth == 0 { 6 } else { 7 };

  match rng.gen_range(0 .. max) {
    0 => Value::SimpleString(random_string(rng.gen_range(0 .. 32)).into()),
    1 => Value::Error(random_string(rng.gen_range(0 .. 32)).into()),
    2 => Value::Integer(rng.gen()),
    3 => {
      let len = rng.gen_range(0 .. 256);
      Value::BulkString(Bytes::from((0 .. len).map(|_| rng.gen::<u8>()).collect::<Vec<u8>>()))
    },
    4 => Value::Null,
    5 => Value::NullArray,
    _ => Value::Array((0 .. rng.gen_range(0 .. 8)).map(|_| random_value(depth - 1)).collect()),
  }
}

fn deep_array(depth: usize) -> (Vec<u8>, Vec<u8>) {
  let mut head = b"*2\r\n".to_vec();
  for _ in 0 .. depth {
    head.extend_from_slice(b"*1\r\n");
  }
  head.extend_from_slice(b":1\r\n");

  (head, b"$-1\r\n".to_vec())
}

/// Walk the first element of each nested array, returning the number of levels.
fn nested_depth(value: &Value) -> usize {
  let mut levels = 0;
  let mut current = value;
  while let Value::Array(values) = current {
    levels += 1;
    match values.first() {
      Some(inner) => current = inner,
      None => break,
    }
  }
  levels
}

#[tokio::test(flavor = "multi_thread")]
async fn should_use_codec_ping() {
  let _ = pretty_env_logger::try_init();
  let (mut client, mut server) = framed_pair();

  client.send(resp_encode_command("PING")).await.unwrap();
  let request = server.next().await.unwrap().unwrap();
  assert_eq!(request, Value::Array(vec![Value::BulkString("PING".into())]));

  server.send(Value::SimpleString("PONG".into())).await.unwrap();
  let response = client.next().await.unwrap().unwrap();
  assert_eq!(response.as_str().unwrap(), "PONG");
}

#[tokio::test(flavor = "multi_thread")]
async fn should_use_codec_get_set() {
  let _ = pretty_env_logger::try_init();
  let (mut client, mut server) = framed_pair();

  client.send(resp_encode_command("GET foo")).await.unwrap();
  let _ = server.next().await.unwrap().unwrap();
  server.send(Value::Null).await.unwrap();
  let response = client.next().await.unwrap().unwrap();
  assert_eq!(response.kind(), ValueKind::Null);

  client.send(resp_encode_command("SET foo bar")).await.unwrap();
  let request = server.next().await.unwrap().unwrap();
  assert_eq!(request, Value::Array(vec!["SET".into(), "foo".into(), "bar".into()]));
  server.send(Value::SimpleString("OK".into())).await.unwrap();
  let response = client.next().await.unwrap().unwrap();
  assert_eq!(response.as_str().unwrap(), "OK");

  client.send(resp_encode_command("DEL foo")).await.unwrap();
  let _ = server.next().await.unwrap().unwrap();
  server.send(Value::Integer(1)).await.unwrap();
  let response = client.next().await.unwrap().unwrap();
  assert_eq!(response.to_string().unwrap(), "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn should_use_codec_hgetall() {
  let _ = pretty_env_logger::try_init();
  let (mut client, mut server) = framed_pair();

  client.send(resp_encode_command("HGETALL foo")).await.unwrap();
  let _ = server.next().await.unwrap().unwrap();

  let expected = Value::Array(vec![
    Value::BulkString("a".into()),
    Value::BulkString("b".into()),
    Value::BulkString("c".into()),
    Value::BulkString("d".into()),
  ]);
  server.send(expected.clone()).await.unwrap();
  let response = client.next().await.unwrap().unwrap();
  assert_eq!(response, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_round_trip_random_values() {
  let _ = pretty_env_logger::try_init();
  let (mut client, mut server) = framed_pair();

  for _ in 0 .. 200 {
    let value = random_value(3);
    debug!("Sending {:?} value", value.kind());

    let sent = value.clone();
    let send = tokio::spawn(async move {
      client.send(sent).await.unwrap();
      client
    });
    let received = server.next().await.unwrap().unwrap();
    client = send.await.unwrap();

    assert_eq!(received, value);
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn should_end_stream_when_peer_closes() {
  let _ = pretty_env_logger::try_init();
  let (mut client, mut server) = framed_pair();

  client.send(Value::Integer(1)).await.unwrap();
  drop(client);

  assert_eq!(server.next().await.unwrap().unwrap(), Value::Integer(1));
  assert!(server.next().await.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn should_error_on_unknown_type_byte() {
  let _ = pretty_env_logger::try_init();
  let (client, server) = duplex(64);
  let mut client = Framed::new(client, BytesCodec::new());
  let mut server = Framed::new(server, Resp::new(DecoderConfig::default()));

  client.send(Bytes::from_static(b"!21\r\nSYNTAX invalid syntax\r\n")).await.unwrap();
  let err = server.next().await.unwrap().unwrap_err();
  assert_eq!(err.kind(), &RespErrorKind::UnknownTypeTag);
}

#[test]
fn should_decode_deep_array_split_across_reads() {
  let _ = pretty_env_logger::try_init();
  let (head, tail) = deep_array(200_000);
  let mut codec = Resp::default();
  let mut buf = BytesMut::from(&head[..]);

  assert_eq!(codec.decode(&mut buf).unwrap(), None);
  assert_eq!(buf.len(), head.len());

  buf.extend_from_slice(&tail);
  let value = codec.decode(&mut buf).unwrap().unwrap();
  assert!(buf.is_empty());
  assert_eq!(nested_depth(&value), 200_000 + 1);
  assert_eq!(value.into_array().unwrap().pop(), Some(Value::Null));
}

#[tokio::test(flavor = "multi_thread")]
async fn should_decode_deep_array_sent_in_chunks() {
  let _ = pretty_env_logger::try_init();
  let (head, tail) = deep_array(100_000);
  let (client, server) = duplex(1024 * 1024);
  let mut client = Framed::new(client, BytesCodec::new());
  let mut server = Framed::new(server, Resp::default());

  client.send(Bytes::from(head)).await.unwrap();
  let send = tokio::spawn(async move {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    client.send(Bytes::from(tail)).await.unwrap();
    client
  });

  let value = server.next().await.unwrap().unwrap();
  let _client = send.await.unwrap();
  debug!("Received {:?} value", value.kind());
  assert_eq!(nested_depth(&value), 100_000 + 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_reject_simple_string_with_line_break() {
  let _ = pretty_env_logger::try_init();
  let (mut client, _server) = framed_pair();

  let err = client.send(Value::SimpleString("a\r\nb".into())).await.unwrap_err();
  assert_eq!(err.kind(), &RespErrorKind::EncodeError);
}
