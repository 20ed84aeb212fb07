// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bridge from `std::panic` to the unhandled-exception signal.
//!
//! Hosts that embed Rust code directly (tooling, headless servers, native
//! plugins) have no engine raising unhandled-exception notifications for
//! them. Installing this hook feeds panics into the same signal the
//! monitor already watches. The previously installed hook still runs, so
//! the usual stderr report is preserved.

use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;
use std::sync::Arc;

use tracing::debug;

use kiln_crash_core::ExceptionInfo;

use crate::signal::{ExceptionEvent, RuntimeSignals};

/// Install a panic hook that emits on the unhandled-exception signal.
pub fn install_panic_hook(signals: Arc<RuntimeSignals>) {
	let previous_hook = std::panic::take_hook();

	std::panic::set_hook(Box::new(move |info| {
		// Capture before anything else runs; unwinding will not get
		// another chance at this stack.
		let backtrace = Backtrace::force_capture();
		signals
			.exceptions
			.emit(&ExceptionEvent::new(exception_from_panic(info, &backtrace)));

		previous_hook(info);
	}));

	debug!("panic hook installed");
}

/// Build the expected exception shape from panic information.
fn exception_from_panic(info: &PanicHookInfo<'_>, backtrace: &Backtrace) -> ExceptionInfo {
	let message = extract_panic_message(info);
	let combined = match info.location() {
		Some(location) => format!("Panic: {} at {}", message, location),
		None => format!("Panic: {}", message),
	};

	ExceptionInfo::new(combined, Some(backtrace.to_string()))
}

/// Extract the panic message from the payload.
fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
	if let Some(s) = info.payload().downcast_ref::<&str>() {
		s.to_string()
	} else if let Some(s) = info.payload().downcast_ref::<String>() {
		s.clone()
	} else {
		"Box<dyn Any>".to_string()
	}
}
