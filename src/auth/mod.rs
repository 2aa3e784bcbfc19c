// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Auth provider cleanup: the lock state machine and the cleanup routine.

pub mod cleanup;
pub mod lock;

pub use cleanup::{CleanupService, SecretCleanup};
pub use lock::{CleanupLock, CleanupStep};
