/*!
The [`Exporter`] type.

An exporter receives mapped [`TelemetryLogRecord`]s and writes them to some telemetry pipeline, like an OpenTelemetry `Logger`. The bridge finds its exporter through an [`ExporterSource`] on every event, so the exporter can be installed, swapped, or removed while events are flowing.
*/

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use emit::empty::Empty;

use crate::{error::Error, record::TelemetryLogRecord};

/**
A destination for mapped records.
*/
pub trait Exporter {
    /**
    Write a record.

    Exporters are called on the thread that produced the underlying event, so they shouldn't block for long.
    */
    fn emit(&self, record: TelemetryLogRecord);
}

impl<'a, T: Exporter + ?Sized> Exporter for &'a T {
    fn emit(&self, record: TelemetryLogRecord) {
        (**self).emit(record)
    }
}

impl<'a, T: Exporter + ?Sized + 'a> Exporter for Box<T> {
    fn emit(&self, record: TelemetryLogRecord) {
        (**self).emit(record)
    }
}

impl<'a, T: Exporter + ?Sized + 'a> Exporter for Arc<T> {
    fn emit(&self, record: TelemetryLogRecord) {
        (**self).emit(record)
    }
}

impl<T: Exporter> Exporter for Option<T> {
    fn emit(&self, record: TelemetryLogRecord) {
        match self {
            Some(exporter) => exporter.emit(record),
            None => Empty.emit(record),
        }
    }
}

impl Exporter for Empty {
    fn emit(&self, _: TelemetryLogRecord) {}
}

/**
An [`Exporter`] from a function.

Use [`from_fn`] to create one.
*/
pub struct FromFn<F>(F);

impl<F: Fn(TelemetryLogRecord)> Exporter for FromFn<F> {
    fn emit(&self, record: TelemetryLogRecord) {
        (self.0)(record)
    }
}

/**
Create an [`Exporter`] from a function.
*/
pub fn from_fn<F: Fn(TelemetryLogRecord)>(f: F) -> FromFn<F> {
    FromFn(f)
}

/**
A shared handle to an [`Exporter`].
*/
pub type SharedExporter = Arc<dyn Exporter + Send + Sync>;

/**
A way to find the [`Exporter`] to write an event to.
*/
pub trait ExporterSource {
    /**
    Get the current exporter.

    Returns `Ok(None)` if there's no exporter installed. Returns an error if an exporter may exist but couldn't be obtained.
    */
    fn exporter(&self) -> Result<Option<SharedExporter>, Error>;
}

impl<'a, T: ExporterSource + ?Sized> ExporterSource for &'a T {
    fn exporter(&self) -> Result<Option<SharedExporter>, Error> {
        (**self).exporter()
    }
}

impl<'a, T: ExporterSource + ?Sized + 'a> ExporterSource for Box<T> {
    fn exporter(&self) -> Result<Option<SharedExporter>, Error> {
        (**self).exporter()
    }
}

impl<'a, T: ExporterSource + ?Sized + 'a> ExporterSource for Arc<T> {
    fn exporter(&self) -> Result<Option<SharedExporter>, Error> {
        (**self).exporter()
    }
}

impl ExporterSource for Empty {
    fn exporter(&self) -> Result<Option<SharedExporter>, Error> {
        Ok(None)
    }
}

/**
An atomically swappable [`Exporter`].

Reading the current exporter doesn't take any locks, so the slot can be read on every event while another thread replaces it.
*/
#[derive(Default)]
pub struct ExporterSlot(ArcSwapOption<Box<dyn Exporter + Send + Sync>>);

impl ExporterSlot {
    /**
    Create an empty slot.
    */
    pub fn new() -> Self {
        ExporterSlot::default()
    }

    /**
    Replace the exporter in the slot.

    Passing `None` removes the current exporter. Events that already loaded the previous exporter finish writing to it.
    */
    pub fn set<E: Exporter + Send + Sync + 'static>(&self, exporter: Option<E>) {
        self.0
            .store(exporter.map(|exporter| Arc::new(Box::new(exporter) as Box<dyn Exporter + Send + Sync>)));
    }

    /**
    Whether an exporter is currently installed.
    */
    pub fn is_set(&self) -> bool {
        self.0.load().is_some()
    }
}

impl ExporterSource for ExporterSlot {
    fn exporter(&self) -> Result<Option<SharedExporter>, Error> {
        Ok(self
            .0
            .load_full()
            .map(|exporter| exporter as SharedExporter))
    }
}

/**
An [`ExporterSource`] from a function.

Use [`source_from_fn`] to create one.
*/
pub struct SourceFromFn<F>(F);

impl<F: Fn() -> Result<Option<SharedExporter>, Error>> ExporterSource for SourceFromFn<F> {
    fn exporter(&self) -> Result<Option<SharedExporter>, Error> {
        (self.0)()
    }
}

/**
Create an [`ExporterSource`] from a function that looks up the exporter lazily.

This is useful when the exporter depends on state owned by something else, like the telemetry SDK of the application an event belongs to.
*/
pub fn source_from_fn<F: Fn() -> Result<Option<SharedExporter>, Error>>(f: F) -> SourceFromFn<F> {
    SourceFromFn(f)
}
