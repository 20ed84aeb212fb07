// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fingerprinting for grouping repeated crashes.

use sha2::{Digest, Sha256};

/// How many leading trace lines participate in the fingerprint.
const FINGERPRINT_FRAMES: usize = 5;

/// Compute a stable fingerprint for a crash.
///
/// The fingerprint is a SHA-256 hash based on:
/// 1. Exception name (most significant)
/// 2. The leading non-empty stack-trace lines
///
/// The cause text is deliberately excluded: two crashes with the same name
/// and the same throw site group together even when their messages carry
/// varying data.
pub fn compute_fingerprint(name: &str, stack_trace: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(name.as_bytes());
	hasher.update(b"|");

	for line in stack_trace
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.take(FINGERPRINT_FRAMES)
	{
		hasher.update(line.as_bytes());
		hasher.update(b"|");
	}

	hex::encode(hasher.finalize())
}
