// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The capture monitor: subscription lifecycle, intake, and forwarding.
//!
//! The monitor owns the subscriptions to the engine's unhandled-exception
//! and log signals for as long as capture is active, normalizes qualifying
//! events into crash records, and forwards them to the reporting sink.
//! A telemetry failure must never become a host-application failure:
//! every sink call is checked and absorbed here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use kiln_crash_core::{
	classify, parse_message, Classification, CrashRecord, LogEvent, Severity,
};

use crate::backtrace::resolve_trace;
use crate::error::{MonitorError, Result};
use crate::signal::{ExceptionEvent, RuntimeSignals, SubscriptionId};
use crate::sink::ReportSink;

/// Builder for constructing a [`CrashMonitor`].
pub struct MonitorBuilder {
	api_key: Option<String>,
	signals: Option<Arc<RuntimeSignals>>,
	sink: Option<Arc<dyn ReportSink>>,
}

impl MonitorBuilder {
	pub fn new() -> Self {
		Self {
			api_key: None,
			signals: None,
			sink: None,
		}
	}

	/// Sets the API key presented to the sink at registration.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the engine signals to subscribe to.
	pub fn signals(mut self, signals: Arc<RuntimeSignals>) -> Self {
		self.signals = Some(signals);
		self
	}

	/// Sets the reporting sink records are forwarded to.
	pub fn sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
		self.sink = Some(sink);
		self
	}

	/// Builds the monitor. Capture stays inactive until
	/// [`CrashMonitor::enable`] is called.
	pub fn build(self) -> Result<CrashMonitor> {
		let api_key = self.api_key.ok_or(MonitorError::MissingApiKey)?;
		let signals = self.signals.ok_or(MonitorError::MissingSignals)?;
		let sink = self.sink.ok_or(MonitorError::MissingSink)?;

		let inner = Arc::new(MonitorInner {
			api_key,
			session_id: Uuid::now_v7(),
			signals,
			sink,
			registered: AtomicBool::new(false),
			subscriptions: Mutex::new(None),
		});

		Ok(CrashMonitor { inner })
	}
}

impl Default for MonitorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Subscription handles held while capture is active.
struct IntakeSubscriptions {
	exceptions: SubscriptionId,
	logs: SubscriptionId,
}

/// Internal monitor state, shared with the intake closures.
struct MonitorInner {
	api_key: String,
	session_id: Uuid,
	signals: Arc<RuntimeSignals>,
	sink: Arc<dyn ReportSink>,
	/// Whether sink registration succeeded. When false, forwarding
	/// degrades to local logging instead of erroring.
	registered: AtomicBool,
	/// `Some` while subscribed to both signals. Guards the
	/// active/inactive transition against concurrent delivery threads.
	subscriptions: Mutex<Option<IntakeSubscriptions>>,
}

impl MonitorInner {
	fn subscriptions(&self) -> MutexGuard<'_, Option<IntakeSubscriptions>> {
		self.subscriptions
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
	}

	/// Unhandled-exception intake. Payloads that are absent or not of
	/// the expected shape are dropped without a report.
	fn intake_exception(&self, event: &ExceptionEvent) {
		let Some(info) = event.info() else {
			return;
		};

		let resolved = resolve_trace(info.stack_trace.as_deref());
		if resolved.is_fallback() {
			warn!(
				message = %info.message,
				"exception event carried no stack trace, synthesized one from the handler stack"
			);
		}

		let parsed = parse_message(&info.message);
		self.forward_record(CrashRecord::new(
			parsed.name,
			parsed.cause,
			resolved.trace,
			Severity::Unhandled,
		));
	}

	/// Log-event intake: classify, then either annotate or normalize.
	fn intake_log(&self, event: &LogEvent) {
		match classify(event.level) {
			Classification::Informational => {
				self.forward_user_log(event.level, &event.message);
			}
			Classification::CrashWorthy => {
				let resolved = resolve_trace(event.stack_trace.as_deref());
				if resolved.is_fallback() {
					warn!(
						level = %event.level,
						message = %event.message,
						"log event carried no stack trace, synthesized one from the handler stack"
					);
				}

				let parsed = parse_message(&event.message);
				self.forward_record(CrashRecord::new(
					parsed.name,
					parsed.cause,
					resolved.trace,
					Severity::Unhandled,
				));
			}
		}
	}

	fn forward_record(&self, record: CrashRecord) {
		if !self.registered.load(Ordering::SeqCst) {
			debug!(
				name = %record.name,
				cause = %record.cause,
				severity = %record.severity,
				"sink unregistered, keeping crash record local"
			);
			return;
		}

		let name = record.name.clone();
		let cause = record.cause.clone();
		if let Err(e) = self.sink.submit_record(record) {
			error!(
				name = %name,
				cause = %cause,
				error = %e,
				"failed to forward crash record"
			);
		}
	}

	fn forward_user_log(&self, level: kiln_crash_core::LogLevel, message: &str) {
		if !self.registered.load(Ordering::SeqCst) {
			debug!(level = %level, message = %message, "sink unregistered, keeping user log local");
			return;
		}

		if let Err(e) = self.sink.submit_user_log(level, message) {
			warn!(level = %level, error = %e, "failed to forward user log");
		}
	}
}

/// Client-side crash capture for an engine-hosted application.
///
/// Constructed by the host's composition root (see
/// [`MonitorCell`](crate::cell::MonitorCell) for the at-most-one
/// guarantee) and cheap to clone; clones share state.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use kiln_crash::{CrashMonitor, MemorySink, RuntimeSignals};
///
/// let signals = Arc::new(RuntimeSignals::new());
/// let monitor = CrashMonitor::builder()
///     .api_key("key_xxx")
///     .signals(Arc::clone(&signals))
///     .sink(Arc::new(MemorySink::new()))
///     .build()?;
///
/// monitor.enable();
/// // ... engine delivers events through `signals` ...
/// monitor.disable();
/// ```
#[derive(Clone)]
pub struct CrashMonitor {
	inner: Arc<MonitorInner>,
}

impl CrashMonitor {
	/// Creates a new builder for constructing a CrashMonitor.
	pub fn builder() -> MonitorBuilder {
		MonitorBuilder::new()
	}

	/// Subscribe the intake handlers and register with the sink.
	///
	/// Idempotent: enabling an active monitor leaves the existing
	/// subscriptions in place. Sink registration is best-effort; on
	/// failure the monitor stays enabled but keeps records local.
	pub fn enable(&self) {
		let mut subscriptions = self.inner.subscriptions();
		if subscriptions.is_some() {
			debug!("crash capture already active");
			return;
		}

		let weak = Arc::downgrade(&self.inner);
		let exceptions = self.inner.signals.exceptions.subscribe(move |event| {
			if let Some(inner) = weak.upgrade() {
				inner.intake_exception(event);
			}
		});

		let weak = Arc::downgrade(&self.inner);
		let logs = self.inner.signals.logs.subscribe(move |event| {
			if let Some(inner) = weak.upgrade() {
				inner.intake_log(event);
			}
		});

		*subscriptions = Some(IntakeSubscriptions { exceptions, logs });
		info!(session_id = %self.inner.session_id, "crash capture enabled");

		match self.inner.sink.register_handler(&self.inner.api_key) {
			Ok(()) => {
				self.inner.registered.store(true, Ordering::SeqCst);
				info!("reporting sink registered");
			}
			Err(e) => {
				self.inner.registered.store(false, Ordering::SeqCst);
				warn!(error = %e, "sink registration failed, capture degrades to local logging");
			}
		}
	}

	/// Release both subscriptions.
	///
	/// Idempotent: disabling an inactive monitor is a no-op. Deliveries
	/// already in flight on another thread complete; no further intake
	/// fires afterwards.
	pub fn disable(&self) {
		let mut subscriptions = self.inner.subscriptions();
		match subscriptions.take() {
			Some(subs) => {
				self.inner.signals.exceptions.unsubscribe(subs.exceptions);
				self.inner.signals.logs.unsubscribe(subs.logs);
				info!("crash capture disabled");
			}
			None => debug!("crash capture already inactive"),
		}
	}

	/// True while subscribed to both signals.
	pub fn is_active(&self) -> bool {
		self.inner.subscriptions().is_some()
	}

	/// This process's capture session id.
	pub fn session_id(&self) -> Uuid {
		self.inner.session_id
	}

	/// Unhandled-exception intake entry point for runtimes that call the
	/// monitor directly instead of emitting on the signal.
	pub fn on_unhandled_exception(&self, event: &ExceptionEvent) {
		self.inner.intake_exception(event);
	}

	/// Log-event intake entry point for runtimes that call the monitor
	/// directly instead of emitting on the signal.
	pub fn on_log_event(&self, event: &LogEvent) {
		self.inner.intake_log(event);
	}

	/// Report an error the application caught itself.
	pub fn capture_error(&self, error: &dyn std::error::Error) {
		self.capture_handled(&error.to_string(), None);
	}

	/// Report a handled failure from a combined message, with an
	/// optional trace from the catch site.
	pub fn capture_handled(&self, message: &str, stack_trace: Option<&str>) {
		let resolved = resolve_trace(stack_trace);
		let parsed = parse_message(message);
		self.inner.forward_record(CrashRecord::new(
			parsed.name,
			parsed.cause,
			resolved.trace,
			Severity::Handled,
		));
	}
}
