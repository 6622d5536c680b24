use super::*;

#[test]
fn none_is_empty_with_generation_zero() {
    let none = PpSet::none();
    assert!(none.is_empty());
    assert_eq!(none.generation(), 0);
}

#[test]
fn clone_is_equal_and_mutual_subset() {
    let s = PpSet::from_members([PpId::MutexLock, PpId::Cli]);
    let c = s.clone();
    assert_eq!(s, c);
    assert!(s.subset(&c));
    assert!(c.subset(&s));
}

#[test]
fn union_is_associative() {
    let a = PpSet::from_members([PpId::MutexLock]);
    let b = PpSet::from_members([PpId::MutexUnlock]);
    let c = PpSet::from_members([PpId::Cli]);
    assert_eq!(a.union(&b.union(&c)), a.union(&b).union(&c));
}

#[test]
fn generation_of_union_is_max_of_generations() {
    let a = PpSet::from_members([PpId::DataRace { eip: 1, generation: 3 }]);
    let b = PpSet::from_members([PpId::MutexLock]);
    assert_eq!(a.generation(), 4);
    assert_eq!(b.generation(), 1);
    assert_eq!(a.union(&b).generation(), 4);
}

#[test]
fn subset_pruning_rule() {
    let small = PpSet::from_members([PpId::MutexLock]);
    let big = PpSet::from_members([PpId::MutexLock, PpId::MutexUnlock]);
    assert!(small.subset(&big));
    assert!(!big.subset(&small));
}

#[test]
fn priority_of_none_is_lowest() {
    assert_eq!(PpSet::none().priority(), i64::MIN);
    assert!(PpSet::from_members([PpId::MutexLock]).priority() > PpSet::none().priority());
}

#[test]
fn printing_is_stable_for_equal_sets() {
    let a = PpSet::from_members([PpId::Cli, PpId::MutexLock]);
    let b = PpSet::from_members([PpId::MutexLock, PpId::Cli]);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn display_of_none_is_empty_braces() {
    assert_eq!(PpSet::none().to_string(), "{}");
}

proptest::proptest! {
    #[test]
    fn union_associative_prop(a in 0u64..4, b in 0u64..4, c in 0u64..4) {
        let mk = |n: u64| PpSet::from_members([PpId::DataRace { eip: n, generation: 0 }]);
        let (sa, sb, sc) = (mk(a), mk(b), mk(c));
        proptest::prop_assert_eq!(sa.union(&sb.union(&sc)), sa.union(&sb).union(&sc));
    }
}
