// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash capture SDK for engine-hosted applications.
//!
//! This crate watches the two event streams an engine runtime exposes —
//! unhandled-exception notifications and log messages — classifies what
//! arrives, normalizes crash-worthy events into structured records
//! (exception name, cause, stack trace), and forwards them to a reporting
//! sink. Informational log traffic is forwarded as lightweight user-log
//! annotations instead.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use kiln_crash::{CrashMonitor, MemorySink, MonitorCell, RuntimeSignals};
//!
//! // The composition root owns the signals, the sink, and the cell.
//! let signals = Arc::new(RuntimeSignals::new());
//! let sink = Arc::new(MemorySink::new());
//!
//! let cell = MonitorCell::new();
//! let monitor = cell.get_or_init(|| {
//!     CrashMonitor::builder()
//!         .api_key("key_xxx")
//!         .signals(Arc::clone(&signals))
//!         .sink(sink)
//!         .build()
//!         .expect("monitor configuration")
//! });
//!
//! monitor.enable();
//!
//! // The engine delivers events by emitting on the signals:
//! // signals.logs.emit(&event);
//! // signals.exceptions.emit(&exception);
//!
//! monitor.disable();
//! ```
//!
//! # Degraded operation
//!
//! Capture never turns a telemetry failure into an application failure.
//! When the sink is unavailable or rejects registration, the monitor
//! stays enabled and keeps records local (logged via `tracing`); every
//! forwarding call checks its result and absorbs errors.

pub mod backtrace;
pub mod cell;
pub mod error;
pub mod monitor;
pub mod panic_hook;
pub mod signal;
pub mod sink;

pub use backtrace::{resolve_trace, synthesize_trace, ResolvedTrace, TraceOrigin};
pub use cell::MonitorCell;
pub use error::{MonitorError, Result};
pub use monitor::{CrashMonitor, MonitorBuilder};
pub use panic_hook::install_panic_hook;
pub use signal::{ExceptionEvent, RuntimeSignals, Signal, SubscriptionId};
pub use sink::{MemorySink, ReportSink, SinkError, UnavailableSink, UserLogEntry};

// Re-export core types for convenience
pub use kiln_crash_core::{
	classify, parse_message, Classification, CrashRecord, ExceptionInfo, LogEvent, LogLevel,
	ParsedMessage, RecordId, Severity,
};
