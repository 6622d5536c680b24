use super::*;

#[test]
fn non_interrupt_driven_seeds_are_none_and_the_two_mutex_pps() {
    let seeds = baseline_seeds(false);
    assert_eq!(seeds.len(), 3);
    assert!(seeds[0].pp_set.is_empty());
    assert!(!seeds[0].should_reproduce, "NONE never reproduces");
    assert!(seeds[1].should_reproduce);
    assert!(seeds[2].should_reproduce);
}

#[test]
fn interrupt_driven_adds_cli_sti_and_their_union() {
    let seeds = baseline_seeds(true);
    assert_eq!(seeds.len(), 6);
    let union = &seeds[5].pp_set;
    assert!(seeds[1].pp_set.subset(union));
    assert!(seeds[2].pp_set.subset(union));
    assert!(seeds[3].pp_set.subset(union));
    assert!(seeds[4].pp_set.subset(union));
}

#[test]
fn maximal_seed_is_the_union_of_every_baseline_seed() {
    let seed = maximal_seed(true);
    for s in baseline_seeds(true) {
        assert!(s.pp_set.subset(&seed.pp_set));
    }
    assert!(seed.should_reproduce);
}
