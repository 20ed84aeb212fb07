// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The reporting-sink boundary.
//!
//! The sink is the external backend that durably stores crash records and
//! user-log annotations. This crate only defines the call contract; real
//! transports live with the platform integration. Every operation returns
//! an explicit result so call sites can check it instead of intercepting
//! thrown failures.

use std::sync::{Mutex, MutexGuard, PoisonError};

use kiln_crash_core::{CrashRecord, LogLevel};
use thiserror::Error;

/// Failures a reporting sink can surface.
#[derive(Debug, Error)]
pub enum SinkError {
	/// The sink is not initialized or the platform is unsupported.
	#[error("reporting sink unavailable on this platform")]
	Unavailable,

	/// The API key was rejected at registration.
	#[error("invalid API key")]
	InvalidApiKey,

	/// The sink refused a submission.
	#[error("sink rejected submission: {0}")]
	Rejected(String),
}

/// The three-operation contract the capture monitor forwards into.
pub trait ReportSink: Send + Sync {
	/// Register this process with the backend. Best-effort: the monitor
	/// logs a failure and keeps running locally.
	fn register_handler(&self, api_key: &str) -> Result<(), SinkError>;

	/// Accept one normalized crash record. Fire-and-forget from the
	/// monitor's perspective.
	fn submit_record(&self, record: CrashRecord) -> Result<(), SinkError>;

	/// Accept a lightweight informational annotation.
	fn submit_user_log(&self, level: LogLevel, message: &str) -> Result<(), SinkError>;
}

/// One informational annotation accepted by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLogEntry {
	pub level: LogLevel,
	pub message: String,
}

#[derive(Debug, Default)]
struct MemorySinkState {
	api_key: Option<String>,
	records: Vec<CrashRecord>,
	user_logs: Vec<UserLogEntry>,
}

/// In-memory sink for tests, examples, and local development.
#[derive(Debug, Default)]
pub struct MemorySink {
	state: Mutex<MemorySinkState>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, MemorySinkState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// The API key accepted at registration, if any.
	pub fn registered_key(&self) -> Option<String> {
		self.state().api_key.clone()
	}

	/// Snapshot of every record accepted so far.
	pub fn records(&self) -> Vec<CrashRecord> {
		self.state().records.clone()
	}

	/// Snapshot of every user-log annotation accepted so far.
	pub fn user_logs(&self) -> Vec<UserLogEntry> {
		self.state().user_logs.clone()
	}
}

impl ReportSink for MemorySink {
	fn register_handler(&self, api_key: &str) -> Result<(), SinkError> {
		if api_key.trim().is_empty() {
			return Err(SinkError::InvalidApiKey);
		}
		self.state().api_key = Some(api_key.to_string());
		Ok(())
	}

	fn submit_record(&self, record: CrashRecord) -> Result<(), SinkError> {
		self.state().records.push(record);
		Ok(())
	}

	fn submit_user_log(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
		self.state().user_logs.push(UserLogEntry {
			level,
			message: message.to_string(),
		});
		Ok(())
	}
}

/// Stand-in for a platform with no reporting backend. Every operation
/// fails with [`SinkError::Unavailable`]; the monitor degrades to
/// local-log-only behavior.
#[derive(Debug, Default)]
pub struct UnavailableSink;

impl ReportSink for UnavailableSink {
	fn register_handler(&self, _api_key: &str) -> Result<(), SinkError> {
		Err(SinkError::Unavailable)
	}

	fn submit_record(&self, _record: CrashRecord) -> Result<(), SinkError> {
		Err(SinkError::Unavailable)
	}

	fn submit_user_log(&self, _level: LogLevel, _message: &str) -> Result<(), SinkError> {
		Err(SinkError::Unavailable)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kiln_crash_core::Severity;

	#[test]
	fn memory_sink_accumulates_submissions() {
		let sink = MemorySink::new();
		sink.register_handler("key_123").unwrap();

		sink.submit_record(CrashRecord::new("E", "boom", "at Foo()", Severity::Unhandled))
			.unwrap();
		sink.submit_user_log(LogLevel::Log, "loading level 2").unwrap();

		assert_eq!(sink.registered_key().as_deref(), Some("key_123"));
		assert_eq!(sink.records().len(), 1);
		assert_eq!(sink.records()[0].name, "E");
		assert_eq!(
			sink.user_logs(),
			vec![UserLogEntry {
				level: LogLevel::Log,
				message: "loading level 2".to_string(),
			}]
		);
	}

	#[test]
	fn memory_sink_rejects_blank_api_key() {
		let sink = MemorySink::new();
		assert!(matches!(
			sink.register_handler("  "),
			Err(SinkError::InvalidApiKey)
		));
		assert!(sink.registered_key().is_none());
	}

	#[test]
	fn unavailable_sink_fails_every_operation() {
		let sink = UnavailableSink;
		assert!(matches!(
			sink.register_handler("key"),
			Err(SinkError::Unavailable)
		));
		assert!(matches!(
			sink.submit_record(CrashRecord::new("E", "c", "t", Severity::Handled)),
			Err(SinkError::Unavailable)
		));
		assert!(matches!(
			sink.submit_user_log(LogLevel::Warning, "m"),
			Err(SinkError::Unavailable)
		));
	}
}
