//! The response sink abstraction.

use crate::error::SinkError;
use async_trait::async_trait;
use bytes::Bytes;

/// Writable side of an HTTP response.
///
/// `write` completes once the sink has accepted the chunk. After `end` or
/// `abort` the sink accepts nothing more.
#[async_trait]
pub trait ResponseSink: Send {
	/// Writes one chunk of the body.
	async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError>;

	/// Completes the response.
	async fn end(&mut self) -> Result<(), SinkError>;

	/// Terminates the response without completing it.
	async fn abort(&mut self, reason: &str);
}

/// In-memory sink collecting everything written to it.
#[derive(Debug, Default)]
pub struct BufferSink {
	chunks: Vec<Bytes>,
	end_calls: usize,
	aborted: Option<String>,
}

impl BufferSink {
	/// Creates an empty sink.
	pub fn new() -> Self {
		Self::default()
	}

	/// Chunks in write order.
	pub fn chunks(&self) -> &[Bytes] {
		&self.chunks
	}

	/// Concatenated body, decoded lossily as UTF-8.
	pub fn body(&self) -> String {
		let bytes: Vec<u8> = self.chunks.iter().flat_map(|c| c.iter().copied()).collect();
		String::from_utf8_lossy(&bytes).into_owned()
	}

	/// Whether `end` succeeded.
	pub fn is_ended(&self) -> bool {
		self.end_calls > 0 && self.aborted.is_none()
	}

	/// How many times `end` was called.
	pub fn end_calls(&self) -> usize {
		self.end_calls
	}

	/// Reason given to `abort`, if the sink was aborted.
	pub fn abort_reason(&self) -> Option<&str> {
		self.aborted.as_deref()
	}

	fn check_open(&self) -> Result<(), SinkError> {
		if let Some(reason) = &self.aborted {
			return Err(SinkError::Aborted(reason.clone()));
		}
		if self.end_calls > 0 {
			return Err(SinkError::Ended);
		}
		Ok(())
	}
}

#[async_trait]
impl ResponseSink for BufferSink {
	async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
		self.check_open()?;
		self.chunks.push(chunk);
		Ok(())
	}

	async fn end(&mut self) -> Result<(), SinkError> {
		let open = self.check_open();
		self.end_calls += 1;
		open
	}

	async fn abort(&mut self, reason: &str) {
		if self.aborted.is_none() && self.end_calls == 0 {
			self.aborted = Some(reason.to_string());
		}
	}
}
