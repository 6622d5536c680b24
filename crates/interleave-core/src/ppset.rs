//! Preemption-point identifiers and immutable PP sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// One syntactic preemption point: a function entry, a data-race address, or
/// a fixed "priority class" constant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PpId {
    /// The baseline "no preemptions" marker. Never appears inside a non-empty
    /// set; only `PpSet::none()` may be empty.
    MutexLock,
    MutexUnlock,
    Cli,
    Sti,
    /// A dynamically discovered data-race address, tagged with the
    /// generation at which it was discovered.
    DataRace { eip: u64, generation: u32 },
}

impl PpId {
    /// Priority used to order early exploration; higher is preferred.
    /// Fixed classes are ordered as in the original driver's priority mask;
    /// dynamically discovered race PPs sort after all fixed classes.
    pub fn priority(&self) -> i64 {
        match self {
            PpId::Cli => 40,
            PpId::Sti => 30,
            PpId::MutexLock => 20,
            PpId::MutexUnlock => 10,
            PpId::DataRace { .. } => 0,
        }
    }

    /// One plus the generation at which this PP was discovered. Fixed
    /// classes (seeded at startup) have generation 0.
    pub fn generation(&self) -> u32 {
        match self {
            PpId::DataRace { generation, .. } => *generation,
            _ => 0,
        }
    }
}

impl fmt::Display for PpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PpId::MutexLock => write!(f, "mutex_lock"),
            PpId::MutexUnlock => write!(f, "mutex_unlock"),
            PpId::Cli => write!(f, "cli"),
            PpId::Sti => write!(f, "sti"),
            PpId::DataRace { eip, generation } => write!(f, "race@{:#x}/g{}", eip, generation),
        }
    }
}

/// An immutable, cheaply-cloneable set of PP identifiers. Cloning is an
/// `Arc` bump, not a deep copy — once a set is written into a job's config it
/// is never mutated, so sharing across jobs and bug records is safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpSet(Arc<BTreeSet<PpId>>);

impl PpSet {
    /// The empty set: the "no preemptions" baseline run.
    pub fn none() -> Self {
        Self(Arc::new(BTreeSet::new()))
    }

    pub fn from_members(members: impl IntoIterator<Item = PpId>) -> Self {
        Self(Arc::new(members.into_iter().collect()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PpId> {
        self.0.iter()
    }

    /// Union of two sets. Used when deriving a larger configuration from a
    /// smaller one plus a newly discovered PP.
    pub fn union(&self, other: &PpSet) -> PpSet {
        PpSet(Arc::new(self.0.union(&other.0).cloned().collect()))
    }

    /// True iff every member of `self` is in `other`.
    pub fn subset(&self, other: &PpSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Max priority over members; the empty set has a defined lowest value.
    pub fn priority(&self) -> i64 {
        self.0.iter().map(PpId::priority).max().unwrap_or(i64::MIN)
    }

    /// One plus the max generation over members; `none()` has generation 0.
    pub fn generation(&self) -> u32 {
        self.0.iter().map(PpId::generation).max().map(|g| g + 1).unwrap_or(0)
    }
}

impl fmt::Display for PpSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{}");
        }
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

impl Default for PpSet {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
#[path = "ppset_tests.rs"]
mod tests;
