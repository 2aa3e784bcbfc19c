// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cleanup lock of an auth provider.
//!
//! The lock is stored in the `management.cattle.io/auth-provider-cleanup`
//! annotation of the AuthConfig. Cleanup of a provider's auxiliary resources
//! only runs when the provider gets disabled while the lock is `unlocked`.
//! Admins can set `user-locked` up front to prevent cleanup altogether; that
//! value is never overwritten.

use std::fmt;

const UNLOCKED: &str = "unlocked";
const USER_LOCKED: &str = "user-locked";
const RANCHER_LOCKED: &str = "rancher-locked";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupLock {
    /// No annotation yet
    Unset,
    /// Cleanup runs once the provider is disabled
    Unlocked,
    /// Locked by an admin, never cleaned up nor changed
    UserLocked,
    /// Locked after cleanup or because the provider was never enabled
    RancherLocked,
    /// A value this controller does not know
    Invalid(String),
}

/// What to do for a given lock and provider state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStep {
    /// Write the lock without running cleanup
    Annotate(CleanupLock),
    /// Run cleanup, then lock with [`CleanupLock::RancherLocked`]
    CleanupThenLock,
    /// The provider is disabled but the lock forbids cleanup
    Refuse(CleanupLock),
    /// Nothing to do
    Keep,
}

impl CleanupLock {
    /// Parse the annotation value; a missing or empty annotation is `Unset`.
    pub fn from_annotation(value: Option<&str>) -> Self {
        match value.unwrap_or_default() {
            "" => CleanupLock::Unset,
            UNLOCKED => CleanupLock::Unlocked,
            USER_LOCKED => CleanupLock::UserLocked,
            RANCHER_LOCKED => CleanupLock::RancherLocked,
            other => CleanupLock::Invalid(other.to_string()),
        }
    }

    /// Annotation value, `None` for states that are never written
    pub fn as_annotation(&self) -> Option<&str> {
        match self {
            CleanupLock::Unlocked => Some(UNLOCKED),
            CleanupLock::UserLocked => Some(USER_LOCKED),
            CleanupLock::RancherLocked => Some(RANCHER_LOCKED),
            CleanupLock::Unset | CleanupLock::Invalid(_) => None,
        }
    }

    /// Transition for a provider that is currently `enabled` or not
    pub fn next(&self, enabled: bool) -> CleanupStep {
        match (self, enabled) {
            (CleanupLock::Unset, true) => CleanupStep::Annotate(CleanupLock::Unlocked),
            (CleanupLock::Unset, false) => CleanupStep::Annotate(CleanupLock::RancherLocked),
            (CleanupLock::RancherLocked, true) => CleanupStep::Annotate(CleanupLock::Unlocked),
            (CleanupLock::Unlocked, false) => CleanupStep::CleanupThenLock,
            (CleanupLock::Unlocked | CleanupLock::UserLocked, true) => CleanupStep::Keep,
            (CleanupLock::Invalid(_), true) => CleanupStep::Keep,
            (CleanupLock::RancherLocked | CleanupLock::UserLocked | CleanupLock::Invalid(_), false) => {
                CleanupStep::Refuse(self.clone())
            }
        }
    }
}

impl fmt::Display for CleanupLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupLock::Unset => write!(f, "<unset>"),
            CleanupLock::Invalid(value) => write!(f, "{} (invalid)", value),
            lock => write!(f, "{}", lock.as_annotation().unwrap_or_default()),
        }
    }
}
