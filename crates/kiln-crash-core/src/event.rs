// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Engine-facing event shapes consumed by the capture pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EventError;

/// Severity of an engine log message.
///
/// Mirrors the host engine's log channel taxonomy. `Assert` and
/// `Exception` are distinct channels on the engine side even though both
/// end up crash-worthy here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
	Log,
	Warning,
	Error,
	Assert,
	Exception,
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Log => write!(f, "log"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
			Self::Assert => write!(f, "assert"),
			Self::Exception => write!(f, "exception"),
		}
	}
}

impl FromStr for LogLevel {
	type Err = EventError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"log" => Ok(Self::Log),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			"assert" => Ok(Self::Assert),
			"exception" => Ok(Self::Exception),
			_ => Err(EventError::InvalidLogLevel(s.to_string())),
		}
	}
}

/// A single log message delivered by the engine runtime.
///
/// Owned by the caller; the capture pipeline never retains one beyond the
/// synchronous handling of the delivery. `stack_trace` is `None` when the
/// engine omits it, which production builds are known to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
	pub message: String,
	pub stack_trace: Option<String>,
	pub level: LogLevel,
}

impl LogEvent {
	/// Convenience constructor for an event without a stack trace.
	pub fn bare(level: LogLevel, message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			stack_trace: None,
			level,
		}
	}
}

/// The exception shape expected on the unhandled-exception signal.
///
/// Payloads that cannot be read as this shape are dropped by the monitor
/// without producing a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionInfo {
	pub message: String,
	pub stack_trace: Option<String>,
}

impl ExceptionInfo {
	pub fn new(message: impl Into<String>, stack_trace: Option<String>) -> Self {
		Self {
			message: message.into(),
			stack_trace,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn log_level_roundtrip(level in prop_oneof![
			Just(LogLevel::Log),
			Just(LogLevel::Warning),
			Just(LogLevel::Error),
			Just(LogLevel::Assert),
			Just(LogLevel::Exception),
		]) {
			let s = level.to_string();
			let parsed: LogLevel = s.parse().unwrap();
			prop_assert_eq!(level, parsed);
		}
	}

	#[test]
	fn log_level_rejects_unknown() {
		assert!("fatal".parse::<LogLevel>().is_err());
		assert!("Log".parse::<LogLevel>().is_err());
	}

	#[test]
	fn bare_event_has_no_trace() {
		let event = LogEvent::bare(LogLevel::Error, "boom");
		assert_eq!(event.message, "boom");
		assert!(event.stack_trace.is_none());
	}
}
