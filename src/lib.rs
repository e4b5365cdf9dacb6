//! # RESP Codec
//!
//! Types and functions for decoding and encoding the [RESP2](https://redis.io/docs/reference/protocol-spec/)
//! protocol over blocking byte streams, in-memory buffers, and framed `tokio` transports.
//!
//! ## Examples
//!
//! ```rust
//! use bytes::BytesMut;
//! use resp_codec::{decode::decode, encode::extend_encode, Decoder, Encoder, Value};
//!
//! let value = Value::Array(vec!["SET".into(), "foo".into(), "bar".into()]);
//!
//! // encode into a `BytesMut`
//! let mut buf = BytesMut::new();
//! let len = extend_encode(&mut buf, &value).unwrap();
//! assert_eq!(&buf[..], b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");
//!
//! // decode from a slice, returning `None` if the buffer holds an incomplete value
//! assert_eq!(decode(&buf).unwrap(), Some((value.clone(), len)));
//! assert_eq!(decode(&buf[.. len - 1]).unwrap(), None);
//!
//! // or bind an encoder and decoder to blocking streams
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.encode(&value).unwrap();
//! encoder.encode(&Value::Null).unwrap();
//! let out = encoder.into_inner().unwrap();
//!
//! let mut decoder = Decoder::new(&out[..]);
//! assert_eq!(decoder.decode_next().unwrap(), value);
//! assert_eq!(decoder.decode_next().unwrap(), Value::Null);
//! assert!(decoder.decode_next().unwrap_err().is_end_of_stream());
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate cookie_factory;

#[macro_use]
mod macros;

pub(crate) mod utils;

/// Decoding functions and types for blocking byte sources and in-memory buffers.
pub mod decode;
/// Encoding functions and types for blocking byte sinks and in-memory buffers.
pub mod encode;
/// Error types.
pub mod error;
/// The RESP value type and protocol constants.
pub mod types;

/// Encoding and decoding interfaces for the `tokio-util` codec traits.
#[cfg(feature = "codec")]
#[cfg_attr(docsrs, doc(cfg(feature = "codec")))]
pub mod codec;

pub use decode::{Decoder, DecoderConfig};
pub use encode::Encoder;
pub use error::{RespError, RespErrorKind};
pub use types::{Value, ValueKind};
pub use utils::{digits_in_number, ZEROED_KB};
