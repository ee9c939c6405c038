//! Sink errors.

/// Errors raised while writing to a response sink.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
	/// The receiving side went away.
	#[error("response receiver closed")]
	Closed,

	/// The sink was already ended.
	#[error("response already ended")]
	Ended,

	/// The response was aborted.
	#[error("response aborted: {0}")]
	Aborted(String),
}
