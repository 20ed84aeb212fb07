// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash-worthiness classification of engine log events.

use serde::{Deserialize, Serialize};

use crate::event::LogLevel;

/// How the capture pipeline routes a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
	/// Forwarded as a lightweight user-log annotation. No stack-trace
	/// handling happens on this path.
	Informational,
	/// Normalized into a crash record and forwarded to the sink.
	CrashWorthy,
}

/// Classify a log event by its level.
pub fn classify(level: LogLevel) -> Classification {
	match level {
		LogLevel::Log | LogLevel::Warning => Classification::Informational,
		LogLevel::Error | LogLevel::Assert | LogLevel::Exception => Classification::CrashWorthy,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quiet_levels_are_informational() {
		assert_eq!(classify(LogLevel::Log), Classification::Informational);
		assert_eq!(classify(LogLevel::Warning), Classification::Informational);
	}

	#[test]
	fn failure_levels_are_crash_worthy() {
		assert_eq!(classify(LogLevel::Error), Classification::CrashWorthy);
		assert_eq!(classify(LogLevel::Assert), Classification::CrashWorthy);
		assert_eq!(classify(LogLevel::Exception), Classification::CrashWorthy);
	}
}
