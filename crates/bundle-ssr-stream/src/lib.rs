//! Response streaming for bundle-ssr.
//!
//! [`StreamWriter`] splices a render stream between the head and tail of a
//! split template and writes the result to a [`ResponseSink`]. The sink is
//! asynchronous: a write completes only once the sink has accepted the
//! chunk, so a slow client slows the render down instead of growing a
//! buffer.
//!
//! [`channel`] pairs a [`ChannelSink`] with a [`ResponseBody`] that can be
//! handed to hyper as the response body.
//!
//! ```
//! use bundle_ssr_stream::{BufferSink, ResponseSink};
//! use bytes::Bytes;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut sink = BufferSink::new();
//! sink.write(Bytes::from_static(b"<p>hi</p>")).await.unwrap();
//! sink.end().await.unwrap();
//! assert_eq!(sink.body(), "<p>hi</p>");
//! # }
//! ```

pub mod body;
pub mod error;
pub mod sink;
pub mod writer;

pub use body::{BoxError, ChannelSink, ResponseBody, channel};
pub use error::SinkError;
pub use sink::{BufferSink, ResponseSink};
pub use writer::{NOT_READY_BODY, StreamPhase, StreamWriter, WriteOutcome, write_not_ready};
