/*!
Managing the sources the bridge is subscribed to.

Subscriptions move through two states. Before a [`Registry`] is available, configuration is buffered. Once [`Subscriptions::init`] provides a registry, the buffered configuration is applied, and every later configuration is applied as a diff against the current set.

The set of applied sources is published as an immutable [`SubscriptionSet`] snapshot. Threads delivering events can read it without taking any locks while configuration changes are in flight.
*/

use std::{
    collections::BTreeSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use arc_swap::ArcSwap;

use crate::{
    config::BridgeConfig,
    error::Error,
    internal_metrics::InternalMetrics,
    registry::Registry,
    source::SourceId,
};

/**
An immutable snapshot of the sources the bridge is subscribed to.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    sources: BTreeSet<SourceId>,
    generation: u64,
}

impl SubscriptionSet {
    /**
    The subscribed sources, in order.
    */
    pub fn sources(&self) -> &BTreeSet<SourceId> {
        &self.sources
    }

    /**
    Whether the given source is subscribed.
    */
    pub fn contains(&self, source: &SourceId) -> bool {
        self.sources.contains(source)
    }

    /**
    Whether no sources are subscribed.
    */
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /**
    The number of times a new set has been published.
    */
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/**
The outcome of applying a configuration.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconfigured {
    /**
    Sources that were newly subscribed.
    */
    pub subscribed: Vec<SourceId>,
    /**
    Sources that were unsubscribed.
    */
    pub unsubscribed: Vec<SourceId>,
    /**
    Sources the registry failed to subscribe or unsubscribe.

    These will be retried on the next configuration change.
    */
    pub failed: Vec<SourceId>,
    /**
    Configured names that didn't refer to a known source.
    */
    pub unknown: Vec<String>,
    /**
    Whether the configuration was buffered because there's no registry yet.
    */
    pub deferred: bool,
}

enum State {
    Uninitialized {
        requested: BTreeSet<SourceId>,
    },
    Active {
        registry: Box<dyn Registry + Send + Sync>,
    },
}

/**
The subscription manager.
*/
pub struct Subscriptions {
    state: Mutex<State>,
    current: ArcSwap<SubscriptionSet>,
    metrics: Arc<InternalMetrics>,
}

impl Default for Subscriptions {
    fn default() -> Self {
        Subscriptions::new()
    }
}

impl Subscriptions {
    /**
    Create a manager without a registry.
    */
    pub fn new() -> Self {
        Subscriptions::with_metrics(Default::default())
    }

    pub(crate) fn with_metrics(metrics: Arc<InternalMetrics>) -> Self {
        Subscriptions {
            state: Mutex::new(State::Uninitialized {
                requested: BTreeSet::new(),
            }),
            current: ArcSwap::from_pointee(SubscriptionSet::default()),
            metrics,
        }
    }

    /**
    Get the sources currently subscribed.

    Before [`Subscriptions::init`] this is always empty, even if a configuration has been buffered.
    */
    pub fn current(&self) -> Arc<SubscriptionSet> {
        self.current.load_full()
    }

    /**
    Whether a registry has been provided through [`Subscriptions::init`].
    */
    pub fn is_active(&self) -> bool {
        matches!(*self.lock(), State::Active { .. })
    }

    /**
    Apply a configuration.

    Unknown source names are reported and skipped. If there's no registry yet, the configuration replaces any earlier one that's waiting for [`Subscriptions::init`].
    */
    pub fn configure(&self, config: &BridgeConfig) -> Reconfigured {
        let unknown = config.unknown_sources();

        for name in &unknown {
            emit::warn!(
                rt: emit::runtime::internal(),
                "ignoring unknown diagnostic source {name}",
            );
        }
        self.metrics
            .config_unknown_source
            .increment_by(unknown.len());

        let requested: BTreeSet<SourceId> = config.resolve().collect();

        let mut state = self.lock();

        let mut reconfigured = match *state {
            State::Uninitialized {
                requested: ref mut buffered,
            } => {
                emit::debug!(
                    rt: emit::runtime::internal(),
                    "deferring {count} diagnostic sources until the registry is available",
                    count: requested.len(),
                );

                *buffered = requested;

                Reconfigured {
                    deferred: true,
                    ..Default::default()
                }
            }
            State::Active { ref registry } => self.apply(registry, &requested),
        };

        reconfigured.unknown = unknown;

        reconfigured
    }

    /**
    Provide the registry and apply any buffered configuration.

    This method can only be called once. Later calls return an error and leave the registry in place.
    */
    pub fn init(&self, registry: impl Registry + Send + Sync + 'static) -> Result<Reconfigured, Error> {
        let mut state = self.lock();

        let requested = match *state {
            State::Uninitialized { ref mut requested } => std::mem::take(requested),
            State::Active { .. } => {
                emit::warn!(
                    rt: emit::runtime::internal(),
                    "the diagnostic registry is already initialized",
                );

                return Err(Error::new("the diagnostic registry is already initialized"));
            }
        };

        let registry: Box<dyn Registry + Send + Sync> = Box::new(registry);
        let reconfigured = self.apply(&registry, &requested);

        *state = State::Active { registry };

        Ok(reconfigured)
    }

    /**
    Diff the requested sources against the applied ones and call the registry.

    Each source gets its own call so a failure doesn't prevent the others from being applied.
    */
    fn apply(&self, registry: &dyn Registry, requested: &BTreeSet<SourceId>) -> Reconfigured {
        let current = self.current.load_full();

        let mut applied = current.sources.clone();
        let mut reconfigured = Reconfigured::default();

        for source in current.sources.difference(requested) {
            match registry.unsubscribe(std::slice::from_ref(source)) {
                Ok(()) => {
                    emit::debug!(
                        rt: emit::runtime::internal(),
                        "unsubscribed from {source}",
                    );

                    applied.remove(source);
                    reconfigured.unsubscribed.push(*source);
                }
                Err(err) => {
                    emit::warn!(
                        rt: emit::runtime::internal(),
                        "failed to unsubscribe from {source}: {err}",
                    );

                    self.metrics.registry_unsubscribe_failed.increment();
                    reconfigured.failed.push(*source);
                }
            }
        }

        for source in requested.difference(&current.sources) {
            match registry.subscribe(std::slice::from_ref(source)) {
                Ok(()) => {
                    emit::debug!(
                        rt: emit::runtime::internal(),
                        "subscribed to {source}",
                    );

                    applied.insert(*source);
                    reconfigured.subscribed.push(*source);
                }
                Err(err) => {
                    emit::warn!(
                        rt: emit::runtime::internal(),
                        "failed to subscribe to {source}: {err}",
                    );

                    self.metrics.registry_subscribe_failed.increment();
                    reconfigured.failed.push(*source);
                }
            }
        }

        if applied != current.sources {
            self.current.store(Arc::new(SubscriptionSet {
                sources: applied,
                generation: current.generation + 1,
            }));
        }

        reconfigured
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("current", &*self.current.load_full())
            .finish_non_exhaustive()
    }
}
