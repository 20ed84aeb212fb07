// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash capture data model.

use thiserror::Error;

/// Errors that can occur while handling crash capture data.
#[derive(Debug, Error)]
pub enum EventError {
	#[error("invalid log level: {0}")]
	InvalidLogLevel(String),

	#[error("invalid severity: {0}")]
	InvalidSeverity(String),

	#[error("invalid record id: {0}")]
	InvalidRecordId(String),
}

/// Result type for crash capture data operations.
pub type Result<T> = std::result::Result<T, EventError>;
