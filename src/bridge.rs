/*!
The [`Bridge`] type.

The bridge is the entry point for events delivered by a [`crate::Registry`]. Each event is classified by its source, checked against the loop guard, mapped into a [`TelemetryLogRecord`], and written to the current [`Exporter`].
*/

use std::{fmt, sync::Arc};

use emit::empty::Empty;

use crate::{
    config::BridgeConfig,
    ctxt::Ctxt,
    error::{Error, MapError},
    event::DiagnosticEvent,
    exporter::{Exporter, ExporterSlot, ExporterSource},
    internal_metrics::InternalMetrics,
    loop_guard,
    mapper::{Mapper, ProcessInfo},
    record::TelemetryLogRecord,
    registry::{Handler, Registry},
    source::{self, EventType, Location},
    subscription::{Reconfigured, SubscriptionSet, Subscriptions},
};

/**
Start building a [`Bridge`].
*/
pub fn setup() -> Setup {
    Setup::new()
}

/**
A builder for a [`Bridge`].

Use [`setup`] to create one.
*/
pub struct Setup<C = Empty, S = ExporterSlot> {
    process: Option<ProcessInfo>,
    ctxt: C,
    exporter: S,
    config: BridgeConfig,
}

impl Default for Setup {
    fn default() -> Self {
        Self::new()
    }
}

impl Setup {
    /**
    Create a builder with no exporter, no trace context, and no sources.
    */
    pub fn new() -> Self {
        Setup {
            process: None,
            ctxt: Empty,
            exporter: ExporterSlot::new(),
            config: BridgeConfig::default(),
        }
    }
}

impl<C> Setup<C, ExporterSlot> {
    /**
    Install an exporter that records will be written to.

    The exporter can be swapped later with [`Bridge::set_exporter`].
    */
    pub fn exporter<E: Exporter + Send + Sync + 'static>(self, exporter: E) -> Self {
        self.exporter.set(Some(exporter));
        self
    }
}

impl<C, S> Setup<C, S> {
    /**
    Set the process info attached to every record.

    If this method isn't called, the process info is detected with [`ProcessInfo::from_env`].
    */
    pub fn process(mut self, process: ProcessInfo) -> Self {
        self.process = Some(process);
        self
    }

    /**
    Capture the active trace context of mapped records from the given [`Ctxt`].
    */
    pub fn ctxt<U: Ctxt>(self, ctxt: U) -> Setup<U, S> {
        Setup {
            process: self.process,
            ctxt,
            exporter: self.exporter,
            config: self.config,
        }
    }

    /**
    Find the exporter for each event through the given [`ExporterSource`] instead of a swappable slot.
    */
    pub fn exporter_source<U: ExporterSource>(self, exporter: U) -> Setup<C, U> {
        Setup {
            process: self.process,
            ctxt: self.ctxt,
            exporter,
            config: self.config,
        }
    }

    /**
    Set the initial configuration.

    The configuration is applied when a registry is provided through [`Bridge::init`].
    */
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /**
    Build the bridge.
    */
    pub fn build(self) -> Bridge<C, S> {
        let metrics = Arc::new(InternalMetrics::default());
        let subscriptions = Subscriptions::with_metrics(metrics.clone());

        subscriptions.configure(&self.config);

        Bridge {
            mapper: Mapper::new(self.process.unwrap_or_else(ProcessInfo::from_env))
                .with_ctxt(self.ctxt),
            exporter: self.exporter,
            subscriptions,
            metrics,
        }
    }
}

/**
Forwards diagnostic events to a telemetry exporter.

The bridge is shared between the threads that produce events and the thread that applies configuration. Handling an event doesn't take any locks.
*/
pub struct Bridge<C = Empty, S = ExporterSlot> {
    mapper: Mapper<C>,
    exporter: S,
    subscriptions: Subscriptions,
    metrics: Arc<InternalMetrics>,
}

/**
What happened to a handled event.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /**
    The event was mapped and written to the exporter.
    */
    Emitted,
    /**
    The event was discarded.
    */
    Skipped(Skip),
}

/**
The reason an event was discarded.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /**
    The event came from a source the bridge doesn't know.
    */
    UnknownSource,
    /**
    The event is the rendered output of a record the bridge already exported.
    */
    BridgeArtifact,
    /**
    There's no exporter installed.
    */
    ExporterAbsent,
    /**
    The exporter couldn't be obtained.
    */
    ExporterUnavailable,
}

impl<C, S> Bridge<C, S> {
    /**
    Apply a configuration.

    If there's no registry yet, the configuration is buffered until [`Bridge::init`].
    */
    pub fn configure(&self, config: &BridgeConfig) -> Reconfigured {
        self.subscriptions.configure(config)
    }

    /**
    Provide the registry and subscribe to the configured sources.

    This method can only be called once.
    */
    pub fn init(&self, registry: impl Registry + Send + Sync + 'static) -> Result<Reconfigured, Error> {
        self.subscriptions.init(registry)
    }

    /**
    The subscription manager.
    */
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /**
    The sources currently subscribed.
    */
    pub fn current_subscriptions(&self) -> Arc<SubscriptionSet> {
        self.subscriptions.current()
    }

    /**
    The process info attached to every record.
    */
    pub fn process(&self) -> &ProcessInfo {
        self.mapper.process()
    }

    /**
    Get an [`emit::metric::Source`] for the bridge's internal metrics.

    The source can be sampled directly, or passed to `emit`'s metric reporter. Each counter also has its own accessor.
    */
    pub fn metric_source(&self) -> BridgeMetrics {
        BridgeMetrics {
            metrics: self.metrics.clone(),
        }
    }
}

impl<C> Bridge<C, ExporterSlot> {
    /**
    Install, replace, or remove the exporter.

    Events already being handled on other threads finish with whichever exporter they loaded.
    */
    pub fn set_exporter<E: Exporter + Send + Sync + 'static>(&self, exporter: Option<E>) {
        self.exporter.set(exporter);
    }
}

impl<C: Ctxt, S: ExporterSource> Bridge<C, S> {
    /**
    Handle an event delivered from the source with the given name and location.

    An error means the event didn't match the shape of its source's event type. Events that are discarded for any other reason return an [`Outcome::Skipped`].

    Subscriptions only decide which sources the registry delivers to the bridge. They aren't checked here, so an event from any known source is forwarded, even if that source isn't currently subscribed.
    */
    pub fn handle(
        &self,
        source_name: &str,
        location: Location,
        evt: &DiagnosticEvent,
    ) -> Result<Outcome, MapError> {
        let event_type = match self.admit(source_name, location, evt) {
            Ok(event_type) => event_type,
            Err(skip) => return Ok(Outcome::Skipped(skip)),
        };

        let exporter = match self.exporter.exporter() {
            Ok(Some(exporter)) => exporter,
            Ok(None) => {
                self.metrics.event_exporter_absent.increment();

                return Ok(Outcome::Skipped(Skip::ExporterAbsent));
            }
            Err(err) => {
                emit::warn!(
                    rt: emit::runtime::internal(),
                    "failed to obtain an exporter for a {event_type} event: {err}",
                    event_type: event_type.as_str(),
                );

                self.metrics.event_exporter_unavailable.increment();

                return Ok(Outcome::Skipped(Skip::ExporterUnavailable));
            }
        };

        let record = self.map(evt, event_type)?;

        exporter.emit(record);
        self.metrics.event_emitted.increment();

        Ok(Outcome::Emitted)
    }

    /**
    Map an event into a record without writing it to the exporter.

    Returns `Ok(None)` if the event would be discarded because of its source or because the bridge produced it.
    */
    pub fn format_event(
        &self,
        source_name: &str,
        location: Location,
        evt: &DiagnosticEvent,
    ) -> Result<Option<TelemetryLogRecord>, MapError> {
        match self.admit(source_name, location, evt) {
            Ok(event_type) => self.map(evt, event_type).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn admit(
        &self,
        source_name: &str,
        location: Location,
        evt: &DiagnosticEvent,
    ) -> Result<EventType, Skip> {
        let Some(event_type) = source::classify(source_name, location) else {
            self.metrics.event_unknown_source.increment();

            return Err(Skip::UnknownSource);
        };

        if loop_guard::is_bridge_artifact(evt) {
            self.metrics.event_bridge_artifact.increment();

            return Err(Skip::BridgeArtifact);
        }

        Ok(event_type)
    }

    fn map(&self, evt: &DiagnosticEvent, event_type: EventType) -> Result<TelemetryLogRecord, MapError> {
        self.mapper.map(evt, event_type).map_err(|err| {
            self.metrics.event_map_failed.increment();

            err
        })
    }
}

impl<C: Ctxt, S: ExporterSource> Handler for Bridge<C, S> {
    fn deliver(&self, source_name: &str, location: Location, evt: &DiagnosticEvent) {
        if let Err(err) = self.handle(source_name, location, evt) {
            emit::error!(
                rt: emit::runtime::internal(),
                "failed to map an event from {source_name}: {err}",
            );
        }
    }
}

impl<C, S> fmt::Debug for Bridge<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("process", self.mapper.process())
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}

/**
Metrics describing the events and configuration changes a [`Bridge`] has handled.
*/
pub struct BridgeMetrics {
    pub(crate) metrics: Arc<InternalMetrics>,
}

impl emit::metric::Source for BridgeMetrics {
    fn sample_metrics<S: emit::metric::sampler::Sampler>(&self, sampler: S) {
        for metric in self.metrics.sample() {
            sampler.metric(metric);
        }
    }
}
