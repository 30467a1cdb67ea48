//! Error types for model construction and queries

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	/// Out-of-range patch, local entity id, parametric direction or value
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// Malformed splines, gno or property stream
	#[error("Parse error at line {line}: {message}")]
	Parse { line: usize, message: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Topology or numbering built from geometry that has since changed
	#[error("{0} is stale, rebuild after geometry changes")]
	Stale(&'static str),

	#[error("{0} has not been built")]
	NotBuilt(&'static str),

	#[error("Integer and text property codes cannot be mixed in one model")]
	MixedPropertyCodes,

	/// Surfaces and volumes in the same model
	#[error("Model kind mismatch: {0}")]
	ModelKind(String),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub fn invalid(msg: impl Into<String>) -> Self {
		Error::InvalidArgument(msg.into())
	}

	pub fn parse(line: usize, msg: impl Into<String>) -> Self {
		Error::Parse {
			line,
			message: msg.into(),
		}
	}
}
