// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash capture SDK.

use thiserror::Error;

/// Result type alias for capture SDK operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur while assembling or installing the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
	/// No API key was supplied to the builder.
	#[error("API key is required")]
	MissingApiKey,

	/// No runtime signals were supplied to the builder.
	#[error("runtime signals are required")]
	MissingSignals,

	/// No reporting sink was supplied to the builder.
	#[error("reporting sink is required")]
	MissingSink,

	/// A monitor is already installed in this cell.
	#[error("a crash monitor is already installed")]
	AlreadyInstalled,
}
