// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: wire up crash capture and run a simulated engine session.
//!
//! Run with:
//!   cargo run --example capture -p kiln-crash

use std::sync::Arc;

use kiln_crash::{
	CrashMonitor, ExceptionEvent, ExceptionInfo, LogEvent, LogLevel, MemorySink, MonitorCell,
	ReportSink, RuntimeSignals,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	let api_key = std::env::var("KILN_API_KEY").unwrap_or_else(|_| "key_example".to_string());

	// Composition root: the host owns the signals, the sink, and the cell.
	let signals = Arc::new(RuntimeSignals::new());
	let sink = Arc::new(MemorySink::new());

	let cell = MonitorCell::new();
	let monitor = cell.install(
		CrashMonitor::builder()
			.api_key(&api_key)
			.signals(Arc::clone(&signals))
			.sink(Arc::clone(&sink) as Arc<dyn ReportSink>)
			.build()?,
	)?;

	println!("Session {} capturing...", monitor.session_id());
	monitor.enable();

	// A duplicate monitor is rejected; the first instance stays in charge.
	let duplicate = CrashMonitor::builder()
		.api_key(&api_key)
		.signals(Arc::clone(&signals))
		.sink(Arc::clone(&sink) as Arc<dyn ReportSink>)
		.build()?;
	if cell.install(duplicate).is_err() {
		println!("Duplicate monitor rejected, as expected.");
	}

	// Simulated engine traffic.
	signals.logs.emit(&LogEvent::bare(LogLevel::Log, "Loading scene 'harbor'"));
	signals.logs.emit(&LogEvent::bare(LogLevel::Warning, "Texture budget at 92%"));

	// A crash-worthy event with a trace from the engine.
	signals.logs.emit(&LogEvent {
		message: "NullReferenceException: Object reference not set".to_string(),
		stack_trace: Some("at Harbor.SpawnShips()\nat Scene.Start()".to_string()),
		level: LogLevel::Exception,
	});

	// The same class of event as a production build delivers it: no trace.
	signals.logs.emit(&LogEvent::bare(
		LogLevel::Error,
		"IOException: Could not open save file",
	));

	// An unhandled-exception notification from the runtime.
	signals.exceptions.emit(&ExceptionEvent::new(ExceptionInfo::new(
		"InvalidOperationException: Scene graph mutated during iteration",
		Some("at SceneGraph.Walk()".to_string()),
	)));

	// A handled failure the application chose to report.
	monitor.capture_handled("FormatException: Bad replay header", None);

	monitor.disable();

	println!("\nUser logs:");
	for entry in sink.user_logs() {
		println!("  [{}] {}", entry.level, entry.message);
	}

	println!("\nCrash records:");
	for record in sink.records() {
		println!("{}", serde_json::to_string_pretty(&record)?);
	}

	Ok(())
}
