// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The composition-root slot holding the process's single monitor.
//!
//! At most one monitor may observe the engine signals; a second one would
//! double-report every crash. Rather than hiding that rule inside global
//! static state, the host's composition root owns a [`MonitorCell`] and
//! every consumer reaches the monitor through it. Creation is
//! exactly-once-safe even when event delivery threads race on first
//! access.

use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::error::{MonitorError, Result};
use crate::monitor::CrashMonitor;

/// Holds the single [`CrashMonitor`] for a composition root.
#[derive(Default)]
pub struct MonitorCell {
	slot: OnceLock<Arc<CrashMonitor>>,
}

impl MonitorCell {
	pub const fn new() -> Self {
		Self {
			slot: OnceLock::new(),
		}
	}

	/// The installed monitor, creating it on first access.
	///
	/// `init` runs at most once per cell, even under concurrent first
	/// access; losers of the race receive the winner's instance.
	pub fn get_or_init(&self, init: impl FnOnce() -> CrashMonitor) -> Arc<CrashMonitor> {
		Arc::clone(self.slot.get_or_init(|| Arc::new(init())))
	}

	/// Install an explicitly constructed monitor.
	///
	/// A second install attempt is rejected and the duplicate is
	/// discarded; the first instance is never replaced.
	pub fn install(&self, monitor: CrashMonitor) -> Result<Arc<CrashMonitor>> {
		let monitor = Arc::new(monitor);
		match self.slot.set(Arc::clone(&monitor)) {
			Ok(()) => Ok(monitor),
			Err(_duplicate) => {
				warn!("duplicate crash monitor discarded, keeping the first instance");
				Err(MonitorError::AlreadyInstalled)
			}
		}
	}

	/// The installed monitor, if any.
	pub fn get(&self) -> Option<Arc<CrashMonitor>> {
		self.slot.get().cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signal::RuntimeSignals;
	use crate::sink::MemorySink;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn fresh_monitor() -> CrashMonitor {
		CrashMonitor::builder()
			.api_key("key_test")
			.signals(Arc::new(RuntimeSignals::new()))
			.sink(Arc::new(MemorySink::new()))
			.build()
			.unwrap()
	}

	#[test]
	fn get_or_init_returns_same_instance() {
		let cell = MonitorCell::new();
		let first = cell.get_or_init(fresh_monitor);
		let second = cell.get_or_init(fresh_monitor);
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn init_runs_at_most_once() {
		let cell = MonitorCell::new();
		let runs = AtomicUsize::new(0);

		for _ in 0..3 {
			cell.get_or_init(|| {
				runs.fetch_add(1, Ordering::SeqCst);
				fresh_monitor()
			});
		}

		assert_eq!(runs.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn second_install_is_rejected_and_discarded() {
		let cell = MonitorCell::new();
		let first = cell.install(fresh_monitor()).unwrap();
		let first_session = first.session_id();

		let result = cell.install(fresh_monitor());
		assert!(matches!(result, Err(MonitorError::AlreadyInstalled)));

		// The first instance survives untouched.
		let current = cell.get().unwrap();
		assert!(Arc::ptr_eq(&first, &current));
		assert_eq!(current.session_id(), first_session);
	}

	#[test]
	fn get_or_init_after_install_returns_installed() {
		let cell = MonitorCell::new();
		let installed = cell.install(fresh_monitor()).unwrap();
		let fetched = cell.get_or_init(fresh_monitor);
		assert!(Arc::ptr_eq(&installed, &fetched));
	}

	#[test]
	fn empty_cell_has_no_monitor() {
		let cell = MonitorCell::new();
		assert!(cell.get().is_none());
	}

	#[test]
	fn concurrent_first_access_creates_one_instance() {
		let cell = Arc::new(MonitorCell::new());
		let mut handles = Vec::new();

		for _ in 0..8 {
			let cell = Arc::clone(&cell);
			handles.push(std::thread::spawn(move || {
				cell.get_or_init(fresh_monitor).session_id()
			}));
		}

		let sessions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
		assert!(sessions.windows(2).all(|w| w[0] == w[1]));
	}
}
