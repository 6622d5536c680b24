//! Baseline PP-set configurations seeded at driver startup.

use interleave_core::{PpId, PpSet};

/// One seed configuration plus whether it should be run with the
/// reproduce-flag set (every seed except `NONE`, so any bug found gets a
/// persisted trace).
pub struct Seed {
    pub pp_set: PpSet,
    pub should_reproduce: bool,
}

/// `NONE`, `{MUTEX_LOCK}`, `{MUTEX_UNLOCK}`, and — when targeting an
/// interrupt-driven kernel — `{CLI}`, `{STI}`, and the union of all of the
/// above.
pub fn baseline_seeds(interrupt_driven_kernel: bool) -> Vec<Seed> {
    let mut sets = vec![PpSet::none(), PpSet::from_members([PpId::MutexLock])];
    sets.push(PpSet::from_members([PpId::MutexUnlock]));

    if interrupt_driven_kernel {
        let cli = PpSet::from_members([PpId::Cli]);
        let sti = PpSet::from_members([PpId::Sti]);
        let union_all =
            sets.iter().skip(1).fold(cli.union(&sti), |acc, s| acc.union(s));
        sets.push(cli);
        sets.push(sti);
        sets.push(union_all);
    }

    sets.into_iter()
        .map(|pp_set| {
            let should_reproduce = !pp_set.is_empty();
            Seed { pp_set, should_reproduce }
        })
        .collect()
}

/// Control/verification mode seeds exactly one maximal configuration: the
/// union of every baseline seed.
pub fn maximal_seed(interrupt_driven_kernel: bool) -> Seed {
    let seeds = baseline_seeds(interrupt_driven_kernel);
    let pp_set = seeds
        .iter()
        .fold(PpSet::none(), |acc, s| acc.union(&s.pp_set));
    Seed { pp_set, should_reproduce: true }
}

#[cfg(test)]
#[path = "seeding_tests.rs"]
mod tests;
