use std::fmt;

use crate::source::EventType;

/**
An error produced by a collaborator of the bridge, like a [`crate::Registry`] failing to subscribe to a source.
*/
pub struct Error(Box<dyn std::error::Error + Send + Sync>);

impl Error {
    /**
    Create an error from a message or another error.
    */
    pub fn new(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error(e.into())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/**
An event was delivered under an event type that doesn't match its shape.

This indicates a defect in whatever produced or classified the event.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapError {
    event_type: EventType,
    variant: &'static str,
}

impl MapError {
    pub(crate) fn new(event_type: EventType, variant: &'static str) -> Self {
        MapError {
            event_type,
            variant,
        }
    }

    /**
    The event type the event was classified as.
    */
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a {} event can't be mapped as `{}`",
            self.variant, self.event_type
        )
    }
}

impl std::error::Error for MapError {}
