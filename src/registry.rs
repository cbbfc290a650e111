/*!
The [`Registry`] and [`Handler`] types.

The registry is the host's catalog of diagnostic sources. The bridge asks it to start or stop delivering events from a source, and the registry pushes events back to a [`Handler`] on whatever thread produced them.
*/

use std::sync::Arc;

use crate::{
    error::Error,
    event::DiagnosticEvent,
    source::{Location, SourceId},
};

/**
A catalog of diagnostic sources that can be subscribed to.
*/
pub trait Registry {
    /**
    Start delivering events from the given sources.
    */
    fn subscribe(&self, sources: &[SourceId]) -> Result<(), Error>;

    /**
    Stop delivering events from the given sources.
    */
    fn unsubscribe(&self, sources: &[SourceId]) -> Result<(), Error>;
}

impl<'a, T: Registry + ?Sized> Registry for &'a T {
    fn subscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        (**self).subscribe(sources)
    }

    fn unsubscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        (**self).unsubscribe(sources)
    }
}

impl<'a, T: Registry + ?Sized + 'a> Registry for Box<T> {
    fn subscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        (**self).subscribe(sources)
    }

    fn unsubscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        (**self).unsubscribe(sources)
    }
}

impl<'a, T: Registry + ?Sized + 'a> Registry for Arc<T> {
    fn subscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        (**self).subscribe(sources)
    }

    fn unsubscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        (**self).unsubscribe(sources)
    }
}

/**
A receiver of events pushed by a [`Registry`].
*/
pub trait Handler {
    /**
    Receive an event from the source with the given name and location.

    This method is called concurrently by any thread that produces events. It must not panic or block for long.
    */
    fn deliver(&self, source_name: &str, location: Location, evt: &DiagnosticEvent);
}

impl<'a, T: Handler + ?Sized> Handler for &'a T {
    fn deliver(&self, source_name: &str, location: Location, evt: &DiagnosticEvent) {
        (**self).deliver(source_name, location, evt)
    }
}

impl<'a, T: Handler + ?Sized + 'a> Handler for Box<T> {
    fn deliver(&self, source_name: &str, location: Location, evt: &DiagnosticEvent) {
        (**self).deliver(source_name, location, evt)
    }
}

impl<'a, T: Handler + ?Sized + 'a> Handler for Arc<T> {
    fn deliver(&self, source_name: &str, location: Location, evt: &DiagnosticEvent) {
        (**self).deliver(source_name, location, evt)
    }
}
