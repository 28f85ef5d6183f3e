// Copyright 2026 the Kinema Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Version stamps and the clock that issues them.
//!
//! Every [`Scene`](crate::entity::Scene) owns exactly one [`VersionClock`].
//! Each clean transition anywhere in the scene consumes the next value, so
//! versions form a single total order across unrelated entities. Composite
//! entities rely on this when comparing their children's versions against
//! each other.

use core::fmt;

/// A freshness stamp issued by a [`VersionClock`].
///
/// `Version::ZERO` is the stamp of an entity that has never been cleaned.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u64);

impl Version {
    /// The stamp carried by freshly created entities.
    pub const ZERO: Self = Self(0);

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Monotonic counter issuing [`Version`] stamps.
///
/// The clock never goes backwards. It is injected into a scene (see
/// [`Scene::with_config`](crate::entity::Scene::with_config)) rather than
/// living in process-wide state, and must not be replaced while entities
/// still hold stamps from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VersionClock {
    last: u64,
}

impl VersionClock {
    /// Creates a clock whose first issued stamp is `v1`.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Creates a clock that resumes after `last`.
    ///
    /// The next stamp issued is `last + 1`.
    #[must_use]
    pub const fn resume_after(last: Version) -> Self {
        Self { last: last.0 }
    }

    /// Issues the next stamp.
    ///
    /// # Panics
    ///
    /// Panics if the counter would overflow.
    pub fn next_version(&mut self) -> Version {
        assert!(self.last < u64::MAX, "version clock exhausted");
        self.last += 1;
        Version(self.last)
    }

    /// Returns the most recently issued stamp ([`Version::ZERO`] if none).
    #[inline]
    #[must_use]
    pub const fn last(&self) -> Version {
        Version(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_strictly_increase() {
        let mut clock = VersionClock::new();
        let a = clock.next_version();
        let b = clock.next_version();
        let c = clock.next_version();
        assert_eq!(a, Version(1));
        assert!(a < b && b < c, "stamps must increase: {a:?} {b:?} {c:?}");
        assert_eq!(clock.last(), c);
    }

    #[test]
    fn resume_continues_after_last() {
        let mut clock = VersionClock::resume_after(Version(41));
        assert_eq!(clock.next_version(), Version(42));
    }

    #[test]
    fn fresh_clock_reports_zero() {
        assert_eq!(VersionClock::new().last(), Version::ZERO);
    }
}
