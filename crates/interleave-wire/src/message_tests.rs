use super::*;

#[test]
fn inbound_progress_round_trips_through_json() {
    let msg = Inbound::Progress {
        elapsed_branches: 64,
        proportion: 0.5,
        elapsed_usecs: 1_000_000,
        total_estimate_usecs: 2_000_000,
        icb_preemption_count: Some(3),
        icb_bound: Some(2),
    };
    let json = serde_json::to_string(&msg).expect("serialize");
    let back: Inbound = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(msg, back);
}

#[test]
fn inbound_tag_is_embedded_in_json_type_field() {
    let msg = Inbound::Hello { child_pid: 1234, protocol_version: 1 };
    let value: serde_json::Value = serde_json::to_value(&msg).expect("to_value");
    assert_eq!(value["type"], "Hello");
    assert_eq!(value["child_pid"], 1234);
}

#[test]
fn outbound_suspend_resume_abort_have_no_payload() {
    for msg in [Outbound::Suspend, Outbound::Resume, Outbound::Abort, Outbound::Continue] {
        let json = serde_json::to_string(&msg).expect("serialize");
        let back: Outbound = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(msg, back);
    }
}

#[test]
fn unknown_tag_fails_to_deserialize() {
    let bogus = r#"{"type":"TotallyUnknownTag"}"#;
    assert!(serde_json::from_str::<Inbound>(bogus).is_err());
}

#[test]
fn data_race_carries_all_fields() {
    let msg = Inbound::DataRace {
        eip: 0x12345,
        last_call_site: 0xabc,
        tid: 7,
        most_recent_syscall: Some("write".into()),
        confirmed: false,
        deterministic: true,
        free_re_malloc: false,
    };
    let json = serde_json::to_string(&msg).expect("serialize");
    let back: Inbound = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(msg, back);
}
