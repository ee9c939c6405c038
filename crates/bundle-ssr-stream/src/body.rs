//! Channel-backed response body.

use crate::error::SinkError;
use crate::sink::ResponseSink;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use http_body_util::StreamBody;
use hyper::body::Frame;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Boxed error type of [`ResponseBody`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body fed by a [`ChannelSink`]; implements `http_body::Body`.
///
/// The body ends when the sink is ended and fails when it is aborted.
pub type ResponseBody = StreamBody<BoxStream<'static, Result<Frame<Bytes>, BoxError>>>;

/// Creates a sink and the body it feeds.
///
/// At most `capacity` chunks are buffered; further writes wait until the
/// body is polled.
pub fn channel(capacity: usize) -> (ChannelSink, ResponseBody) {
	let (tx, rx) = mpsc::channel(capacity.max(1));
	let frames = ReceiverStream::new(rx)
		.map(|item: Result<Bytes, SinkError>| {
			item.map(Frame::data).map_err(|e| -> BoxError { Box::new(e) })
		})
		.boxed();
	(ChannelSink { tx: Some(tx), closed_by: None }, StreamBody::new(frames))
}

/// Sink writing into a bounded channel.
#[derive(Debug)]
pub struct ChannelSink {
	tx: Option<mpsc::Sender<Result<Bytes, SinkError>>>,
	closed_by: Option<SinkError>,
}

impl ChannelSink {
	/// Whether the sink still accepts writes.
	pub fn is_open(&self) -> bool {
		self.tx.is_some()
	}

	fn closed(&self) -> SinkError {
		self.closed_by.clone().unwrap_or(SinkError::Closed)
	}
}

#[async_trait]
impl ResponseSink for ChannelSink {
	async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
		let Some(tx) = &self.tx else {
			return Err(self.closed());
		};
		tx.send(Ok(chunk)).await.map_err(|_| SinkError::Closed)
	}

	async fn end(&mut self) -> Result<(), SinkError> {
		match self.tx.take() {
			Some(_) => {
				self.closed_by = Some(SinkError::Ended);
				Ok(())
			}
			None => Err(self.closed()),
		}
	}

	async fn abort(&mut self, reason: &str) {
		if let Some(tx) = self.tx.take() {
			let error = SinkError::Aborted(reason.to_string());
			self.closed_by = Some(error.clone());
			// The receiver may already be gone.
			let _ = tx.send(Err(error)).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http_body_util::BodyExt;
	use rstest::rstest;
	use std::time::Duration;

	#[rstest]
	#[tokio::test]
	async fn test_body_yields_written_chunks() {
		// Arrange
		let (mut sink, body) = channel(4);

		// Act
		sink.write(Bytes::from("<html>")).await.unwrap();
		sink.write(Bytes::from("</html>")).await.unwrap();
		sink.end().await.unwrap();
		let collected = BodyExt::collect(body).await.unwrap().to_bytes();

		// Assert
		assert_eq!(collected, Bytes::from("<html></html>"));
		assert!(!sink.is_open());
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_waits_for_receiver() {
		// Arrange
		let (mut sink, mut body) = channel(1);
		sink.write(Bytes::from("first")).await.unwrap();

		// Act
		let pending = sink.write(Bytes::from("second"));
		tokio::pin!(pending);
		let blocked = tokio::time::timeout(Duration::from_millis(20), &mut pending).await;
		let first = body.frame().await.unwrap().unwrap().into_data().unwrap();

		// Assert
		assert!(blocked.is_err());
		assert_eq!(first, Bytes::from("first"));
		pending.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_fails_when_receiver_dropped() {
		let (mut sink, body) = channel(1);
		drop(body);

		assert_eq!(sink.write(Bytes::from("x")).await, Err(SinkError::Closed));
	}

	#[rstest]
	#[tokio::test]
	async fn test_abort_fails_body() {
		// Arrange
		let (mut sink, body) = channel(4);
		sink.write(Bytes::from("partial")).await.unwrap();

		// Act
		sink.abort("render failed").await;
		let result = BodyExt::collect(body).await;

		// Assert
		match result {
			Err(error) => assert!(error.to_string().contains("render failed")),
			Ok(_) => panic!("aborted body must not complete"),
		}
		assert_eq!(
			sink.write(Bytes::from("late")).await,
			Err(SinkError::Aborted("render failed".to_string()))
		);
		assert_eq!(sink.end().await, Err(SinkError::Aborted("render failed".to_string())));
	}

	#[rstest]
	#[tokio::test]
	async fn test_end_twice_fails() {
		let (mut sink, _body) = channel(1);

		sink.end().await.unwrap();

		assert_eq!(sink.end().await, Err(SinkError::Ended));
	}
}
