#![no_main]

use libfuzzer_sys::fuzz_target;
use resp_codec::{decode::decode_with_config, encode::extend_encode, Decoder, DecoderConfig};

fuzz_target!(|data: &[u8]| {
  let _ = pretty_env_logger::try_init();
  let config = DecoderConfig::default().with_max_depth(512);

  if let Ok(Some((value, amt))) = decode_with_config(data, &config) {
    let mut buf = bytes::BytesMut::new();
    let len = extend_encode(&mut buf, &value).unwrap();
    assert_eq!(len, amt);
    assert_eq!(&buf[..], &data[.. amt]);

    let redecoded = decode_with_config(&buf, &config).unwrap();
    assert_eq!(redecoded, Some((value, len)));
  }

  let decoder = Decoder::new(data).with_config(config);
  for result in decoder {
    if result.is_err() {
      break;
    }
  }
});
