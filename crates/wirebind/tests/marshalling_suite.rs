//! End-to-end marshalling of declared models into a recording sink.

use std::sync::Arc;

use proptest::prelude::*;
use wirebind::recording::Event;
use wirebind::recording::RecordingSink;
use wirebind::Binding;
use wirebind::ElementKind;
use wirebind::Location;
use wirebind::ProtocolMarshaller;
use wirebind::WireEnum;
use wirebind::WireValue;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

wirebind::wire_enum! {
    pub enum StepState as "StepState" {
        Pending => "PENDING",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

#[derive(Debug, Default, Clone)]
pub struct FailureDetails {
    pub reason: Option<String>,
    pub retryable: Option<bool>,
}

wirebind::structured!(FailureDetails as "FailureDetails" {
    reason => Binding::scalar("Reason", Location::PayloadField),
    retryable => Binding::scalar("Retryable", Location::PayloadField),
});

#[derive(Debug, Default, Clone)]
pub struct StepStatus {
    pub state: Option<StepState>,
    pub failure: Option<FailureDetails>,
    pub notes: Option<Vec<String>>,
}

wirebind::structured!(StepStatus as "StepStatus" {
    state => Binding::scalar("State", Location::PayloadField),
    failure => Binding::structured("FailureDetails"),
    notes => Binding::list("Notes", Location::PayloadField, ElementKind::Scalar),
});

fn string(v: &str) -> WireValue {
    WireValue::String(v.to_string())
}

// ============================================================================
//  END TO END
// ============================================================================

#[test]
fn step_status_marshals_completely() -> anyhow::Result<()> {
    init_tracing();
    let status = StepStatus {
        state: Some(StepState::Failed),
        failure: Some(FailureDetails { reason: Some("timeout".into()), retryable: Some(true) }),
        notes: Some(vec!["one".into(), "two".into(), "three".into()]),
    };

    let mut sink = RecordingSink::new();
    ProtocolMarshaller::new().marshall(Some(&status), &mut sink)?;

    let field = |name: &str, value| Event::Set { location: Location::PayloadField, name: name.to_string(), value };
    assert_eq!(
        sink.into_events(),
        vec![
            field("State", string("FAILED")),
            Event::BeginStructured("FailureDetails".into()),
            field("Reason", string("timeout")),
            field("Retryable", WireValue::Bool(true)),
            Event::EndStructured,
            field("Notes.1", string("one")),
            field("Notes.2", string("two")),
            field("Notes.3", string("three")),
        ]
    );
    Ok(())
}

#[test]
fn one_marshaller_serves_many_threads() -> anyhow::Result<()> {
    init_tracing();
    let marshaller = Arc::new(ProtocolMarshaller::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let marshaller = Arc::clone(&marshaller);
            std::thread::spawn(move || {
                let status = StepStatus { notes: Some(vec![format!("thread-{}", i)]), ..Default::default() };
                let mut sink = RecordingSink::new();
                marshaller.marshall(Some(&status), &mut sink).map(|()| sink.into_events())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let events = handle.join().map_err(|_| anyhow::anyhow!("worker panicked"))??;
        assert_eq!(
            events,
            vec![Event::Set {
                location: Location::PayloadField,
                name: "Notes.1".into(),
                value: string(&format!("thread-{}", i)),
            }]
        );
    }
    Ok(())
}

// ============================================================================
//  PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn list_writes_match_elements(notes in proptest::collection::vec("[a-z0-9]{0,8}", 0..16)) {
        let status = StepStatus { notes: Some(notes.clone()), ..Default::default() };
        let mut sink = RecordingSink::new();
        prop_assert!(ProtocolMarshaller::new().marshall(Some(&status), &mut sink).is_ok());

        let sets = sink.sets();
        prop_assert_eq!(sets.len(), notes.len());
        for (i, (note, (_, name, value))) in notes.iter().zip(sets).enumerate() {
            prop_assert_eq!(name, format!("Notes.{}", i + 1));
            prop_assert_eq!(value, &string(note));
        }
    }

    #[test]
    fn enum_wire_strings_round_trip(index in 0usize..4) {
        let variant = StepState::VOCABULARY.variants().nth(index);
        prop_assert!(variant.is_some());
        if let Some(variant) = variant {
            prop_assert_eq!(StepState::from_wire(variant.to_wire()), Ok(variant));
        }
    }

    #[test]
    fn unknown_wire_strings_fail(wire in "[a-z]{1,12}") {
        // declared spellings are upper case, so nothing lower case can match
        prop_assert!(StepState::from_wire(&wire).is_err());
    }
}
