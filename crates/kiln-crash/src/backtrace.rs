// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack-trace resolution and fallback synthesis.
//!
//! Production engine builds deliver crash-worthy log events without a
//! stack trace. When that happens the only trace available is the one
//! running right now: the intake handler's own call stack. That fallback
//! reflects the dispatch site rather than the throw site, so callers log
//! whenever it is taken.

use rustc_demangle::demangle;
use std::backtrace::Backtrace;

/// Frames to drop from a synthesized trace so the first reported frame is
/// the one that triggered the log, not capture/dispatch internals.
pub(crate) const INTAKE_FRAME_SKIP: usize = 4;

/// Where a resolved stack trace came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOrigin {
	/// The triggering event supplied the trace.
	Supplied,
	/// Synthesized from the intake handler's call stack.
	Synthesized,
}

/// A stack trace plus its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedTrace {
	pub trace: String,
	pub origin: TraceOrigin,
}

impl ResolvedTrace {
	/// True when the trace reflects the handler's stack, not the throw site.
	pub fn is_fallback(&self) -> bool {
		self.origin == TraceOrigin::Synthesized
	}
}

/// Pick the stack trace for a crash-worthy event.
///
/// A non-blank supplied trace is used verbatim. Otherwise the current
/// call stack is captured and trimmed. This function never fails: if
/// capture produces nothing usable the trace is the empty string.
pub fn resolve_trace(supplied: Option<&str>) -> ResolvedTrace {
	match supplied {
		Some(trace) if !trace.trim().is_empty() => ResolvedTrace {
			trace: trace.to_string(),
			origin: TraceOrigin::Supplied,
		},
		_ => ResolvedTrace {
			trace: synthesize_trace(),
			origin: TraceOrigin::Synthesized,
		},
	}
}

/// Capture the current call stack as a formatted trace string.
pub fn synthesize_trace() -> String {
	let backtrace = Backtrace::force_capture();
	let frames = parse_backtrace_string(&backtrace.to_string());

	// The skip is a fixed offset; when a stripped build yields fewer
	// frames than the offset, an untrimmed trace beats an empty one.
	let visible: &[Frame] = if frames.len() > INTAKE_FRAME_SKIP {
		&frames[INTAKE_FRAME_SKIP..]
	} else {
		&frames
	};

	format_frames(visible)
}

/// One parsed backtrace frame.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
	function: String,
	location: Option<String>,
}

/// Parse the display output of `std::backtrace::Backtrace` into frames.
///
/// Frame lines look like `  12: symbol`; each may be followed by an
/// `at path:line:col` continuation that belongs to it.
fn parse_backtrace_string(bt_string: &str) -> Vec<Frame> {
	let mut frames: Vec<Frame> = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(last) = frames.last_mut() {
				if last.location.is_none() {
					last.location = Some(location.trim().to_string());
				}
			}
			continue;
		}

		if let Some(symbol) = split_frame_line(line) {
			frames.push(Frame {
				function: demangle(symbol).to_string(),
				location: None,
			});
		}
	}

	frames
}

/// Strip the `N:` index prefix off a frame line, if it carries one.
fn split_frame_line(line: &str) -> Option<&str> {
	let (prefix, rest) = line.split_once(':')?;
	if prefix.trim().parse::<u32>().is_ok() {
		let symbol = rest.trim();
		(!symbol.is_empty()).then_some(symbol)
	} else {
		None
	}
}

/// Render frames back into a trace string, renumbered from zero.
fn format_frames(frames: &[Frame]) -> String {
	let mut out = String::new();
	for (index, frame) in frames.iter().enumerate() {
		if index > 0 {
			out.push('\n');
		}
		out.push_str(&format!("{:4}: {}", index, frame.function));
		if let Some(location) = &frame.location {
			out.push_str(&format!("\n          at {}", location));
		}
	}
	out
}
