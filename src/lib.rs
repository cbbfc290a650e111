/*!
Forward a host's diagnostic events to an OpenTelemetry logging pipeline.

`diag_bridge` subscribes to diagnostic sources in a host's registry, like messages, traces, and first-failure captures, and maps every event they produce into a structured [`TelemetryLogRecord`]. Records are handed to an [`Exporter`], which is usually an OpenTelemetry `Logger` provided by `diag_bridge_opentelemetry`.

# Getting started

Build a [`Bridge`] with [`setup`], give it the host's [`Registry`], and register it as the registry's [`Handler`]:

```
use std::sync::Arc;

use diag_bridge::{BridgeConfig, Error, Registry, SourceId};

struct HostRegistry;

impl Registry for HostRegistry {
    fn subscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        // Start delivering events from `sources` to the bridge
        Ok(())
    }

    fn unsubscribe(&self, sources: &[SourceId]) -> Result<(), Error> {
        // Stop delivering events from `sources`
        Ok(())
    }
}

let bridge = Arc::new(
    diag_bridge::setup()
        .exporter(diag_bridge::exporter::from_fn(|record| {
            println!("{:?}", record.body());
        }))
        .config(BridgeConfig::new(["message", "ffdc"]))
        .build(),
);

bridge.init(HostRegistry)?;
# Ok::<(), diag_bridge::Error>(())
```

# Configuration

Sources are configured by short name. The known names are `message`, `trace`, and `ffdc`. Unknown names are reported through `emit`'s internal runtime and ignored. Configuration can be changed at any time with [`Bridge::configure`]; the bridge only asks the registry for the sources that changed.

# Troubleshooting

The bridge reports its own problems through `emit`'s internal runtime. Enable it with `emit::setup().init_internal()` to see them. The counters returned by [`Bridge::metric_source`] track how many events were emitted or discarded and why.
*/

mod bridge;
mod config;
mod error;
mod internal_metrics;
mod mapper;

pub mod ctxt;
pub mod event;
pub mod exporter;
pub mod loop_guard;
pub mod record;
pub mod registry;
pub mod severity;
pub mod source;
pub mod subscription;
pub mod well_known;

#[doc(inline)]
pub use self::{
    bridge::{setup, Bridge, BridgeMetrics, Outcome, Setup, Skip},
    config::BridgeConfig,
    ctxt::Ctxt,
    error::{Error, MapError},
    event::{DiagnosticEvent, ExtensionEntry, FailureCapture, MessageEvent},
    exporter::{Exporter, ExporterSlot, ExporterSource, SharedExporter},
    mapper::{collapse_continuations, decode_extension, extension_key, Mapper, ProcessInfo},
    record::{AttributeValue, TelemetryLogRecord, TraceContext},
    registry::{Handler, Registry},
    severity::Severity,
    source::{EventType, Location, SourceId, SourceKind},
    subscription::{Reconfigured, SubscriptionSet, Subscriptions},
};
