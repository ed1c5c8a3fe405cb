//! # Recording Sink
//!
//! An in-memory sink that logs every call it receives. Useful to assert on
//! exactly what a marshaller wrote, and to inject a sink failure at a given
//! wire name.

use crate::binding::Location;
use crate::sink::Sink;
use crate::sink::WireValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Set { location: Location, name: String, value: WireValue },
    BeginStructured(String),
    EndStructured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingError {
    pub name: String,
}

impl std::fmt::Display for RecordingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink refused write to '{}'", self.name)
    }
}

impl std::error::Error for RecordingError {}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<Event>,
    fail_on: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects any write or scope opened under `name`.
    pub fn failing_at(name: impl Into<String>) -> Self {
        Self { events: Vec::new(), fail_on: Some(name.into()) }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The scalar writes only, in call order.
    pub fn sets(&self) -> Vec<(Location, &str, &WireValue)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Set { location, name, value } => Some((*location, name.as_str(), value)),
                _ => None,
            })
            .collect()
    }
}

/// A nested scope of a [`RecordingSink`].
#[derive(Debug)]
pub struct RecordingScope<'a> {
    events: &'a mut Vec<Event>,
    fail_on: Option<&'a str>,
}

fn record_set(
    events: &mut Vec<Event>,
    fail_on: Option<&str>,
    location: Location,
    name: &str,
    value: WireValue,
) -> Result<(), RecordingError> {
    if fail_on == Some(name) {
        return Err(RecordingError { name: name.to_string() });
    }
    events.push(Event::Set { location, name: name.to_string(), value });
    Ok(())
}

fn record_begin<'a>(events: &'a mut Vec<Event>, fail_on: Option<&'a str>, name: &str) -> Result<RecordingScope<'a>, RecordingError> {
    if fail_on == Some(name) {
        return Err(RecordingError { name: name.to_string() });
    }
    events.push(Event::BeginStructured(name.to_string()));
    Ok(RecordingScope { events, fail_on })
}

impl Sink for RecordingSink {
    type Error = RecordingError;
    type Nested<'a> = RecordingScope<'a>;

    fn set_at(&mut self, location: Location, wire_name: &str, value: WireValue) -> Result<(), Self::Error> {
        record_set(&mut self.events, self.fail_on.as_deref(), location, wire_name, value)
    }

    fn begin_structured(&mut self, wire_name: &str) -> Result<Self::Nested<'_>, Self::Error> {
        record_begin(&mut self.events, self.fail_on.as_deref(), wire_name)
    }

    fn finish(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'s> Sink for RecordingScope<'s> {
    type Error = RecordingError;
    type Nested<'a>
        = RecordingScope<'a>
    where
        Self: 'a;

    fn set_at(&mut self, location: Location, wire_name: &str, value: WireValue) -> Result<(), Self::Error> {
        record_set(self.events, self.fail_on, location, wire_name, value)
    }

    fn begin_structured(&mut self, wire_name: &str) -> Result<Self::Nested<'_>, Self::Error> {
        record_begin(self.events, self.fail_on, wire_name)
    }

    fn finish(self) -> Result<(), Self::Error> {
        self.events.push(Event::EndStructured);
        Ok(())
    }
}
