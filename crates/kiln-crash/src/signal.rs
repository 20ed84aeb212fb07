// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Engine event signals with explicit subscription handles.
//!
//! The host runtime delivers events by calling [`Signal::emit`] on the
//! signals it owns. Consumers register handlers and hold on to the
//! returned [`SubscriptionId`]; releasing a subscription is an explicit
//! [`Signal::unsubscribe`] call, not ambient global wiring.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kiln_crash_core::{ExceptionInfo, LogEvent};

/// Handle identifying one registered handler on one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A synchronous broadcast point for one kind of engine event.
///
/// Emission is synchronous on the calling thread. The handler table is
/// snapshotted before any handler runs, so an unsubscribe racing an
/// in-flight emission lets that delivery complete and suppresses the next
/// one.
pub struct Signal<T> {
	handlers: Mutex<HashMap<u64, Handler<T>>>,
	next_id: AtomicU64,
}

impl<T> Signal<T> {
	pub fn new() -> Self {
		Self {
			handlers: Mutex::new(HashMap::new()),
			next_id: AtomicU64::new(0),
		}
	}

	// Capture must keep working even if some handler panicked while the
	// table was locked elsewhere; a poisoned guard is still coherent.
	fn table(&self) -> MutexGuard<'_, HashMap<u64, Handler<T>>> {
		self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Register a handler; the returned id releases it again.
	pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		self.table().insert(id, Arc::new(handler));
		SubscriptionId(id)
	}

	/// Release a handler. Returns false if the id was already released.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.table().remove(&id.0).is_some()
	}

	/// Deliver an event to every registered handler, synchronously.
	pub fn emit(&self, event: &T) {
		let snapshot: Vec<Handler<T>> = self.table().values().cloned().collect();
		for handler in snapshot {
			handler(event);
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.table().len()
	}
}

impl<T> Default for Signal<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

/// The two event sources the capture monitor subscribes to.
#[derive(Debug, Default)]
pub struct RuntimeSignals {
	/// Process-global unhandled-exception notifications.
	pub exceptions: Signal<ExceptionEvent>,
	/// Engine log messages.
	pub logs: Signal<LogEvent>,
}

impl RuntimeSignals {
	pub fn new() -> Self {
		Self::default()
	}
}

/// An unhandled-exception notification.
///
/// The payload is whatever the raising runtime attached. Only payloads
/// carrying an [`ExceptionInfo`] are readable; everything else is dropped
/// by the monitor without a report.
#[derive(Clone)]
pub struct ExceptionEvent {
	payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl ExceptionEvent {
	/// An event carrying the expected exception shape.
	pub fn new(info: ExceptionInfo) -> Self {
		Self {
			payload: Some(Arc::new(info)),
		}
	}

	/// An event carrying an arbitrary payload.
	pub fn opaque(payload: Arc<dyn Any + Send + Sync>) -> Self {
		Self {
			payload: Some(payload),
		}
	}

	/// An event with no payload at all.
	pub fn absent() -> Self {
		Self { payload: None }
	}

	/// The payload, if present and of the expected shape.
	pub fn info(&self) -> Option<&ExceptionInfo> {
		self.payload.as_deref().and_then(|p| p.downcast_ref())
	}
}

impl fmt::Debug for ExceptionEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExceptionEvent")
			.field("payload_present", &self.payload.is_some())
			.field("readable", &self.info().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::AtomicUsize;

	#[test]
	fn emit_reaches_subscriber() {
		let signal: Signal<u32> = Signal::new();
		let seen = Arc::new(AtomicUsize::new(0));

		let seen_clone = Arc::clone(&seen);
		signal.subscribe(move |value| {
			seen_clone.fetch_add(*value as usize, Ordering::SeqCst);
		});

		signal.emit(&3);
		signal.emit(&4);
		assert_eq!(seen.load(Ordering::SeqCst), 7);
	}

	#[test]
	fn unsubscribe_stops_delivery() {
		let signal: Signal<u32> = Signal::new();
		let seen = Arc::new(AtomicUsize::new(0));

		let seen_clone = Arc::clone(&seen);
		let id = signal.subscribe(move |_| {
			seen_clone.fetch_add(1, Ordering::SeqCst);
		});

		signal.emit(&1);
		assert!(signal.unsubscribe(id));
		signal.emit(&1);

		assert_eq!(seen.load(Ordering::SeqCst), 1);
		assert!(!signal.unsubscribe(id), "double release reports false");
	}

	#[test]
	fn subscriber_count_tracks_registrations() {
		let signal: Signal<()> = Signal::new();
		assert_eq!(signal.subscriber_count(), 0);

		let a = signal.subscribe(|_| {});
		let b = signal.subscribe(|_| {});
		assert_eq!(signal.subscriber_count(), 2);
		assert_ne!(a, b);

		signal.unsubscribe(a);
		assert_eq!(signal.subscriber_count(), 1);
	}

	#[test]
	fn emit_without_subscribers_is_fine() {
		let signal: Signal<String> = Signal::new();
		signal.emit(&"nobody listening".to_string());
	}

	#[test]
	fn unsubscribe_from_inside_handler_does_not_deadlock() {
		let signal: Arc<Signal<()>> = Arc::new(Signal::new());
		let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

		let signal_clone = Arc::clone(&signal);
		let slot_clone = Arc::clone(&slot);
		let id = signal.subscribe(move |_| {
			if let Some(id) = slot_clone.lock().unwrap().take() {
				signal_clone.unsubscribe(id);
			}
		});
		*slot.lock().unwrap() = Some(id);

		signal.emit(&());
		assert_eq!(signal.subscriber_count(), 0);
	}

	#[test]
	fn exception_event_downcasts_expected_shape() {
		let event = ExceptionEvent::new(ExceptionInfo::new("E: boom", None));
		assert_eq!(event.info().unwrap().message, "E: boom");
	}

	#[test]
	fn exception_event_rejects_foreign_payloads() {
		let event = ExceptionEvent::opaque(Arc::new("just a string".to_string()));
		assert!(event.info().is_none());

		let event = ExceptionEvent::absent();
		assert!(event.info().is_none());
	}
}
