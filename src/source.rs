/*!
Diagnostic event sources and their classification.

A source is a named category of diagnostic events, like messages or traces, stored in some location. The bridge subscribes to sources by their [`SourceId`]. Configuration refers to sources by short names like `message`, which are resolved through [`resolve`].
*/

use core::{fmt, str::FromStr};

/**
The kind of events produced by a source.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /**
    Application and runtime messages.
    */
    Message,
    /**
    Trace entries.
    */
    Trace,
    /**
    First-failure diagnostic captures.
    */
    Ffdc,
}

/**
Where a source keeps its events.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /**
    An in-memory ring buffer.
    */
    Memory,
    /**
    A persistent, server-wide store.
    */
    Server,
}

/**
The fully qualified identifier of a source that can be subscribed to.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId {
    kind: SourceKind,
    location: Location,
}

/**
The type tag given to events after classification.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /**
    An event from the message source.
    */
    Message,
    /**
    An event from the trace source.
    */
    Trace,
    /**
    An event from the first-failure diagnostic source.
    */
    Ffdc,
}

const KINDS: [SourceKind; 3] = [SourceKind::Message, SourceKind::Trace, SourceKind::Ffdc];

impl SourceKind {
    /**
    The short name used to refer to the source in configuration.
    */
    pub const fn config_name(&self) -> &'static str {
        match self {
            SourceKind::Message => "message",
            SourceKind::Trace => "trace",
            SourceKind::Ffdc => "ffdc",
        }
    }

    /**
    The fully qualified name the registry uses for the source.
    */
    pub const fn source_name(&self) -> &'static str {
        match self {
            SourceKind::Message => "diagnostics.source.message",
            SourceKind::Trace => "diagnostics.source.trace",
            SourceKind::Ffdc => "diagnostics.source.ffdc",
        }
    }

    /**
    Whether the source produces audit records.

    Audit sources are read from [`Location::Server`] instead of [`Location::Memory`].
    */
    pub const fn is_audit(&self) -> bool {
        match self {
            SourceKind::Message | SourceKind::Trace | SourceKind::Ffdc => false,
        }
    }

    /**
    The location events of this kind are subscribed from.
    */
    pub const fn location(&self) -> Location {
        if self.is_audit() {
            Location::Server
        } else {
            Location::Memory
        }
    }

    /**
    The type tag given to events of this kind.
    */
    pub const fn event_type(&self) -> EventType {
        match self {
            SourceKind::Message => EventType::Message,
            SourceKind::Trace => EventType::Trace,
            SourceKind::Ffdc => EventType::Ffdc,
        }
    }

    fn from_config_name(name: &str) -> Option<Self> {
        let name = name.trim();

        KINDS
            .into_iter()
            .find(|kind| kind.config_name().eq_ignore_ascii_case(name))
    }

    fn from_source_name(name: &str) -> Option<Self> {
        KINDS.into_iter().find(|kind| kind.source_name() == name)
    }
}

impl Location {
    /**
    The name the registry uses for the location.
    */
    pub const fn as_str(&self) -> &'static str {
        match self {
            Location::Memory => "memory",
            Location::Server => "server",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
An error parsing a [`Location`].
*/
#[derive(Debug)]
pub struct ParseLocationError {}

impl fmt::Display for ParseLocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the input is not a known source location")
    }
}

impl std::error::Error for ParseLocationError {}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Location::Memory),
            "server" => Ok(Location::Server),
            _ => Err(ParseLocationError {}),
        }
    }
}

impl SourceId {
    /**
    The id a source of the given kind is subscribed by.
    */
    pub const fn new(kind: SourceKind) -> Self {
        SourceId {
            kind,
            location: kind.location(),
        }
    }

    /**
    The kind of events produced by the source.
    */
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /**
    The location the source keeps its events in.
    */
    pub const fn location(&self) -> Location {
        self.location
    }

    /**
    The fully qualified name of the source.
    */
    pub const fn source_name(&self) -> &'static str {
        self.kind.source_name()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.kind.source_name(), self.location)
    }
}

impl emit::value::ToValue for SourceId {
    fn to_value(&self) -> emit::Value<'_> {
        emit::Value::capture_display(self)
    }
}

impl EventType {
    /**
    The tag attached to mapped records.
    */
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::Message => "diag_message",
            EventType::Trace => "diag_trace",
            EventType::Ffdc => "diag_ffdc",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
Resolve a configured source name, like `message`, into the id to subscribe to.

Names are trimmed and compared case-insensitively. Returns `None` if the name isn't a known source.
*/
pub fn resolve(name: &str) -> Option<SourceId> {
    SourceKind::from_config_name(name).map(SourceId::new)
}

/**
Classify an event delivered by the registry from the given source and location.

Returns `None` if the pair doesn't belong to a known source.
*/
pub fn classify(source_name: &str, location: Location) -> Option<EventType> {
    let kind = SourceKind::from_source_name(source_name)?;

    if kind.location() == location {
        Some(kind.event_type())
    } else {
        None
    }
}

/**
Get the configured names that don't resolve to a known source.

Each offending literal is returned once, in the order it first appears.
*/
pub fn validate<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();

    for name in names {
        if resolve(name).is_none() && !unknown.iter().any(|seen| seen == name) {
            unknown.push(name.to_owned());
        }
    }

    unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_names() {
        assert_eq!(Some(SourceId::new(SourceKind::Message)), resolve("message"));
        assert_eq!(Some(SourceId::new(SourceKind::Trace)), resolve(" Trace "));
        assert_eq!(Some(SourceId::new(SourceKind::Ffdc)), resolve("FFDC"));

        assert_eq!(None, resolve("audit"));
        assert_eq!(None, resolve(""));
        assert_eq!(None, resolve("diagnostics.source.message"));
    }

    #[test]
    fn known_sources_live_in_memory() {
        for kind in KINDS {
            assert_eq!(Location::Memory, SourceId::new(kind).location());
        }
    }

    #[test]
    fn source_id_display() {
        assert_eq!(
            "diagnostics.source.trace|memory",
            SourceId::new(SourceKind::Trace).to_string()
        );
    }

    #[test]
    fn classify_source_location_pairs() {
        assert_eq!(
            Some(EventType::Message),
            classify("diagnostics.source.message", Location::Memory)
        );
        assert_eq!(
            Some(EventType::Trace),
            classify("diagnostics.source.trace", Location::Memory)
        );
        assert_eq!(
            Some(EventType::Ffdc),
            classify("diagnostics.source.ffdc", Location::Memory)
        );

        assert_eq!(None, classify("diagnostics.source.message", Location::Server));
        assert_eq!(None, classify("message", Location::Memory));
        assert_eq!(None, classify("diagnostics.source.audit", Location::Server));
    }

    #[test]
    fn validate_reports_unknown_names_once() {
        let unknown = validate(["message", "acces", "trace", "acces", "Audit"]);

        assert_eq!(vec!["acces".to_owned(), "Audit".to_owned()], unknown);
    }

    #[test]
    fn location_roundtrip() {
        for location in [Location::Memory, Location::Server] {
            let parsed: Location = location.to_string().parse().unwrap();

            assert_eq!(location, parsed);
        }

        assert!("disk".parse::<Location>().is_err());
    }
}
