// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The normalized crash record handed to the reporting sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::EventError;
use crate::fingerprint::compute_fingerprint;

/// Unique ID of a crash record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for RecordId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for RecordId {
	type Err = EventError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Uuid::parse_str(s)
			.map(Self)
			.map_err(|_| EventError::InvalidRecordId(s.to_string()))
	}
}

/// Whether the crash was caught by application code or escaped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Handled,
	Unhandled,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Handled => write!(f, "handled"),
			Self::Unhandled => write!(f, "unhandled"),
		}
	}
}

impl FromStr for Severity {
	type Err = EventError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"handled" => Ok(Self::Handled),
			"unhandled" => Ok(Self::Unhandled),
			_ => Err(EventError::InvalidSeverity(s.to_string())),
		}
	}
}

/// A normalized crash event.
///
/// Produced once per qualifying engine event and consumed exactly once by
/// the reporting sink. Immutable after construction: all derivation
/// (id, fingerprint, timestamp) happens in [`CrashRecord::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashRecord {
	pub id: RecordId,
	pub name: String,
	pub cause: String,
	pub stack_trace: String,
	pub severity: Severity,
	/// Stable hash grouping repeats of the same crash.
	pub fingerprint: String,
	pub timestamp: DateTime<Utc>,
}

impl CrashRecord {
	pub fn new(
		name: impl Into<String>,
		cause: impl Into<String>,
		stack_trace: impl Into<String>,
		severity: Severity,
	) -> Self {
		let name = name.into();
		let cause = cause.into();
		let stack_trace = stack_trace.into();
		let fingerprint = compute_fingerprint(&name, &stack_trace);

		Self {
			id: RecordId::new(),
			name,
			cause,
			stack_trace,
			severity,
			fingerprint,
			timestamp: Utc::now(),
		}
	}
}
