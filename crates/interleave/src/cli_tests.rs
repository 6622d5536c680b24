use super::*;

fn base_cli() -> Cli {
    Cli::parse_from(["interleave"])
}

#[test]
fn defaults_are_valid() {
    assert!(base_cli().validate().is_ok());
}

#[test]
fn icb_conflicts_with_control_mode() {
    let mut cli = base_cli();
    cli.icb = true;
    cli.control = true;
    assert!(matches!(cli.validate(), Err(CliError::IcbWithIterativeDeepening)));
}

#[test]
fn control_and_verify_are_mutually_exclusive() {
    let mut cli = base_cli();
    cli.control = true;
    cli.verify = true;
    assert!(matches!(cli.validate(), Err(CliError::ConflictingModes)));
}

#[test]
fn tm_flags_conflict_with_kernel_variant_flags() {
    let mut cli = base_cli();
    cli.tm_x = true;
    cli.kernel_p = true;
    assert!(matches!(cli.validate(), Err(CliError::TmWithKernelVariant)));
}

#[test]
fn kernel_variants_are_mutually_exclusive() {
    let mut cli = base_cli();
    cli.kernel_p = true;
    cli.kernel_4 = true;
    assert!(matches!(cli.validate(), Err(CliError::ConflictingKernelVariants)));
}

#[test]
fn time_budget_parses_suffixes_and_clamps_to_minimum() {
    let mut cli = base_cli();
    cli.time_budget = "2h".to_string();
    assert_eq!(cli.time_budget_usecs().expect("parses"), 2 * 3600 * 1_000_000);

    cli.time_budget = "1s".to_string();
    assert_eq!(
        cli.time_budget_usecs().expect("parses"),
        interleave_core::config::MIN_TIME_BUDGET_USECS
    );
}

#[test]
fn bad_time_budget_is_an_error() {
    let mut cli = base_cli();
    cli.time_budget = "nonsense".to_string();
    assert!(cli.time_budget_usecs().is_err());
}
