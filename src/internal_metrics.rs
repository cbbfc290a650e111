use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bridge::BridgeMetrics;

macro_rules! metrics {
    (
        $pub_container:ty {
            $field:ident: $internal_container:ident {
                $(
                    $(#[$meta:meta])*
                    $metric:ident: $ty:ident -> $pub_ty:ident,
                )*
            }
        }
    ) => {
        #[derive(Default)]
        pub(crate) struct $internal_container {
            $(
                $(#[$meta])*
                pub(crate) $metric: $ty,
            )*
        }

        impl $internal_container {
            pub fn sample(
                &self,
            ) -> impl Iterator<Item = emit::metric::Metric<'static, emit::empty::Empty>> + 'static
            {
                let $internal_container { $($metric),* } = self;

                [$(
                    emit::metric::Metric::new(
                        emit::mdl!(),
                        stringify!($metric),
                        <$ty>::AGG,
                        emit::empty::Empty,
                        $metric.sample(),
                        emit::empty::Empty,
                    ),
                )*]
                .into_iter()
            }
        }

        impl $pub_container {
            $(
                $(#[$meta])*
                pub fn $metric(&self) -> $pub_ty {
                    self.$field.$metric.sample()
                }
            )*
        }
    };
}

#[derive(Default)]
pub(crate) struct Counter(AtomicUsize);

impl Counter {
    const AGG: &'static str = emit::well_known::METRIC_AGG_COUNT;

    pub fn increment(&self) {
        self.increment_by(1);
    }

    pub fn increment_by(&self, by: usize) {
        self.0.fetch_add(by, Ordering::Relaxed);
    }

    pub fn sample(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

metrics!(
    BridgeMetrics {
        metrics: InternalMetrics {
            /**
            An event was mapped and written to the exporter.
            */
            event_emitted: Counter -> usize,
            /**
            An event arrived from a source the bridge doesn't know, so it was discarded.
            */
            event_unknown_source: Counter -> usize,
            /**
            An event was the rendered output of a record the bridge already exported, so it was discarded.
            */
            event_bridge_artifact: Counter -> usize,
            /**
            An event arrived while no exporter was installed, so it was discarded.
            */
            event_exporter_absent: Counter -> usize,
            /**
            The exporter for an event couldn't be obtained, so the event was discarded.
            */
            event_exporter_unavailable: Counter -> usize,
            /**
            An event didn't match the shape of its source's event type, so it couldn't be mapped.
            */
            event_map_failed: Counter -> usize,
            /**
            A configured source name didn't refer to a known source.
            */
            config_unknown_source: Counter -> usize,
            /**
            The registry failed to subscribe to a source.
            */
            registry_subscribe_failed: Counter -> usize,
            /**
            The registry failed to unsubscribe from a source.
            */
            registry_unsubscribe_failed: Counter -> usize,
        }
    }
);
