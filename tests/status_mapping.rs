// tests/status_mapping.rs
use std::collections::BTreeMap;

use meridian_feed::status::{
    aggregate, overall, OverallStatus, PollOutcome, SourceIndicator, SourceState,
};

#[test]
fn per_source_states_map_to_indicators() {
    let raw: BTreeMap<String, SourceState> =
        serde_json::from_str(r#"{"REUTERS":"ok","OSINT":"cached","AP":"timeout"}"#)
            .expect("sources_status parses");

    let got = aggregate(&raw);

    let want: BTreeMap<String, SourceIndicator> = [
        ("REUTERS".to_string(), SourceIndicator::Online),
        ("OSINT".to_string(), SourceIndicator::Warning),
        ("AP".to_string(), SourceIndicator::Offline),
    ]
    .into();
    assert_eq!(got, want);

    let as_json = serde_json::to_value(&got).unwrap();
    assert_eq!(
        as_json,
        serde_json::json!({"REUTERS":"online","OSINT":"warning","AP":"offline"})
    );
}

#[test]
fn unrecognized_and_case_variants_are_offline() {
    for raw in ["OK", "Cached", "", "error", "stale"] {
        assert_eq!(
            SourceIndicator::from(&SourceState::parse(raw)),
            SourceIndicator::Offline,
            "{raw:?} should be offline"
        );
    }
}

#[test]
fn empty_source_map_aggregates_to_empty() {
    assert!(aggregate(&BTreeMap::new()).is_empty());
}

#[test]
fn overall_follows_poll_outcome() {
    assert_eq!(overall(PollOutcome::InProgress), OverallStatus::Loading);
    assert_eq!(overall(PollOutcome::Succeeded), OverallStatus::Ok);
    assert_eq!(overall(PollOutcome::Failed), OverallStatus::Error);
}
