// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use callcentre_simulator::*;

// Include test modules for the queueing model and calendar
mod calendar_tests;

// Include test modules for batch generation and export
mod batch_generation_tests;

#[test]
fn test_call_id_format() {
    let id = CallId::new(41);
    assert_eq!(id.to_string(), "customer41");
    assert_eq!(id.sequence(), 41);
    assert!(CallId::new(1) < CallId::new(2));
}

#[test]
fn test_enum_types() {
    let states = [
        CallState::Arrived,
        CallState::Waiting,
        CallState::InService,
        CallState::Completed,
    ];
    for state in &states {
        assert!(!state.to_string().is_empty());
    }
    assert!(CallState::Completed.is_terminal());

    assert_eq!("truncate".parse::<EndOfDayMode>().unwrap(), EndOfDayMode::Truncate);
    assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert!("xml".parse::<OutputFormat>().is_err());
}

#[test]
fn test_serialization_roundtrip() {
    let id = CallId::new(12);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"customer12\"");
    let deserialized: CallId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);

    let state = CallState::InService;
    let json = serde_json::to_string(&state).unwrap();
    let deserialized: CallState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, deserialized);
}

#[test]
fn test_end_of_day_policy_from_config() {
    let config = SimulationConfig::default();
    assert_eq!(config.end_of_day_policy().unwrap(), EndOfDayPolicy::Complete);

    let config = SimulationConfig {
        end_of_day: "truncate".to_string(),
        truncate_cutoff: Some(630.0),
        ..Default::default()
    };
    assert_eq!(
        config.end_of_day_policy().unwrap(),
        EndOfDayPolicy::Truncate { cutoff: 630.0 }
    );
}
