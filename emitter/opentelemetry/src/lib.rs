/*!
Export bridged diagnostic events through the OpenTelemetry SDK.

This library provides a [`diag_bridge::Exporter`] that writes [`diag_bridge::TelemetryLogRecord`]s to an OpenTelemetry [`Logger`], and a [`diag_bridge::Ctxt`] that reads the active trace and span from the OpenTelemetry [`Context`]. Records are emitted on the thread that produced the underlying event, so they're correlated with whatever span that thread was in.

# Getting started

Configure OpenTelemetry as per its documentation, then build a bridge with [`setup`]:

```
// Configure the OpenTelemetry SDK

let bridge = diag_bridge_opentelemetry::setup()
    .config(diag_bridge::BridgeConfig::new(["message", "trace", "ffdc"]))
    .build();

// Provide the host's registry through `bridge.init`

// Shutdown the OpenTelemetry SDK
# let _ = bridge;
```

Records are sent to an [`opentelemetry::global::logger`] named `diag_bridge`. Use [`OpenTelemetryExporter::from_logger`] to write them to a specific [`Logger`] instead.

# Rendering loops

If the OpenTelemetry SDK is configured to render log records to the console, and the host captures console output as diagnostic events, then those events will be recognized by the bridge's loop guard and discarded.
*/

#![deny(missing_docs)]

use std::fmt;

use diag_bridge::{
    record::RecordParts, AttributeValue, ExporterSlot, Severity, TelemetryLogRecord, TraceContext,
};

use opentelemetry::{
    global::{self, GlobalLoggerProvider},
    logs::{self, AnyValue, LogRecord, Logger, LoggerProvider},
    trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState},
    Context, Key, StringValue,
};

/**
The name of the [`opentelemetry::global::logger`] used by [`setup`].
*/
pub const LOGGER_NAME: &str = "diag_bridge";

/**
Start a builder for a [`diag_bridge::Bridge`] that exports records through the OpenTelemetry SDK.

The returned builder has an [`OpenTelemetryExporter`] for the global logger provider installed, and captures the active trace context through an [`OpenTelemetryCtxt`].
*/
pub fn setup() -> diag_bridge::Setup<OpenTelemetryCtxt, ExporterSlot> {
    diag_bridge::setup()
        .exporter(OpenTelemetryExporter::new(LOGGER_NAME))
        .ctxt(OpenTelemetryCtxt::new())
}

/**
A [`diag_bridge::Exporter`] that writes records to an OpenTelemetry [`Logger`].
*/
pub struct OpenTelemetryExporter<L = <GlobalLoggerProvider as LoggerProvider>::Logger> {
    logger: L,
}

impl OpenTelemetryExporter {
    /**
    Create an exporter for the [`opentelemetry::global::logger`] with the given name.
    */
    pub fn new(name: &'static str) -> Self {
        OpenTelemetryExporter::from_logger(global::logger_provider().logger(name))
    }
}

impl<L> OpenTelemetryExporter<L> {
    /**
    Create an exporter that writes to the given [`Logger`].
    */
    pub fn from_logger(logger: L) -> Self {
        OpenTelemetryExporter { logger }
    }

    /**
    The [`Logger`] records are written to.
    */
    pub fn logger(&self) -> &L {
        &self.logger
    }
}

impl<L: Logger> diag_bridge::Exporter for OpenTelemetryExporter<L> {
    fn emit(&self, record: TelemetryLogRecord) {
        self.logger.emit(otel_log_record(record));
    }
}

impl<L> fmt::Debug for OpenTelemetryExporter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTelemetryExporter").finish_non_exhaustive()
    }
}

/**
A [`diag_bridge::Ctxt`] that reads the active span from the OpenTelemetry [`Context`].
*/
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenTelemetryCtxt {}

impl OpenTelemetryCtxt {
    /**
    Create a ctxt for the current OpenTelemetry context.
    */
    pub fn new() -> Self {
        OpenTelemetryCtxt {}
    }
}

impl diag_bridge::Ctxt for OpenTelemetryCtxt {
    fn current(&self) -> Option<TraceContext> {
        let ctxt = Context::current();
        let span = ctxt.span();
        let span_context = span.span_context();

        // The default context has an invalid span context with zero ids
        if !span_context.is_valid() {
            return None;
        }

        Some(TraceContext {
            trace_id: emit::span::TraceId::from_bytes(span_context.trace_id().to_bytes())?,
            span_id: emit::span::SpanId::from_bytes(span_context.span_id().to_bytes())?,
            trace_flags: span_context.trace_flags().to_u8(),
        })
    }
}

fn otel_log_record(record: TelemetryLogRecord) -> LogRecord {
    let RecordParts {
        body,
        timestamp,
        severity,
        severity_text,
        attributes,
        trace_context,
    } = record.into_parts();

    let mut builder = LogRecord::builder().with_timestamp(timestamp);

    if let Some(body) = body {
        builder = builder.with_body(AnyValue::String(StringValue::from(body)));
    }

    if let Some(severity) = severity {
        builder = builder.with_severity_number(otel_severity(severity));
    }

    if let Some(severity_text) = severity_text {
        builder = builder.with_severity_text(severity_text);
    }

    if let Some(trace_context) = trace_context {
        builder = builder.with_span_context(&SpanContext::new(
            otel_trace_id(trace_context.trace_id),
            otel_span_id(trace_context.span_id),
            TraceFlags::new(trace_context.trace_flags),
            false,
            TraceState::NONE,
        ));
    }

    builder
        .with_attributes(
            attributes
                .into_iter()
                .map(|(k, v)| (Key::from(k), otel_log_value(v)))
                .collect(),
        )
        .build()
}

fn otel_severity(severity: Severity) -> logs::Severity {
    match severity {
        Severity::Trace => logs::Severity::Trace,
        Severity::Debug => logs::Severity::Debug,
        Severity::Debug2 => logs::Severity::Debug2,
        Severity::Debug3 => logs::Severity::Debug3,
        Severity::Debug4 => logs::Severity::Debug4,
        Severity::Info => logs::Severity::Info,
        Severity::Info2 => logs::Severity::Info2,
        Severity::Warn => logs::Severity::Warn,
        Severity::Error => logs::Severity::Error,
        Severity::Fatal => logs::Severity::Fatal,
    }
}

fn otel_log_value(v: AttributeValue) -> AnyValue {
    match v {
        AttributeValue::Int(v) => AnyValue::Int(v),
        AttributeValue::Float(v) => AnyValue::Double(v),
        AttributeValue::Bool(v) => AnyValue::Boolean(v),
        AttributeValue::Str(v) => AnyValue::String(StringValue::from(v)),
    }
}

fn otel_trace_id(trace_id: emit::span::TraceId) -> TraceId {
    TraceId::from_bytes(trace_id.to_bytes())
}

fn otel_span_id(span_id: emit::span::SpanId) -> SpanId {
    SpanId::from_bytes(span_id.to_bytes())
}

#[cfg(test)]
mod tests {
    use std::{
        borrow::Cow,
        sync::{Arc, Mutex},
        time::{Duration, UNIX_EPOCH},
    };

    use diag_bridge::{
        well_known::*, DiagnosticEvent, ExtensionEntry, FailureCapture, Location, MessageEvent,
        Outcome, ProcessInfo,
    };
    use opentelemetry::{
        trace::{Tracer, TracerProvider as _},
        KeyValue,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct CapturingLogger(Arc<Mutex<Vec<LogRecord>>>);

    impl Logger for CapturingLogger {
        fn emit(&self, record: LogRecord) {
            self.0.lock().unwrap().push(record);
        }
    }

    impl CapturingLogger {
        fn take(&self) -> Vec<LogRecord> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    #[derive(Clone, Default)]
    struct CapturingLoggerProvider {
        names: Arc<Mutex<Vec<String>>>,
        logger: CapturingLogger,
    }

    impl LoggerProvider for CapturingLoggerProvider {
        type Logger = CapturingLogger;

        fn versioned_logger(
            &self,
            name: impl Into<Cow<'static, str>>,
            _: Option<Cow<'static, str>>,
            _: Option<Cow<'static, str>>,
            _: Option<Vec<KeyValue>>,
        ) -> Self::Logger {
            self.names.lock().unwrap().push(name.into().into_owned());

            self.logger.clone()
        }

        fn library_logger(&self, library: Arc<opentelemetry::InstrumentationLibrary>) -> Self::Logger {
            self.names.lock().unwrap().push(library.name.clone().into_owned());

            self.logger.clone()
        }
    }

    fn attribute<'a>(record: &'a LogRecord, key: &str) -> Option<&'a AnyValue> {
        record
            .attributes
            .as_ref()?
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    fn string(v: &str) -> AnyValue {
        AnyValue::String(StringValue::from(v.to_owned()))
    }

    #[test]
    fn exporter_writes_log_records() {
        let logger = CapturingLogger::default();

        let bridge = diag_bridge::setup()
            .process(ProcessInfo::new("defaultServer", "/srv/usr"))
            .exporter(OpenTelemetryExporter::from_logger(logger.clone()))
            .build();

        let evt = DiagnosticEvent::from(MessageEvent {
            timestamp_millis: 1_718_000_000_123,
            level: "FINEST".into(),
            severity: Some("FINEST".into()),
            message: "entering loop".into(),
            thread_id: 42,
            extensions: vec![
                ExtensionEntry::new("ext_retryCount_int", "3"),
                ExtensionEntry::new("ext_ratio_float", "0.25"),
                ExtensionEntry::new("ext_cached_bool", "true"),
            ],
            ..Default::default()
        });

        assert_eq!(
            Outcome::Emitted,
            bridge
                .handle("diagnostics.source.trace", Location::Memory, &evt)
                .unwrap()
        );

        let records = logger.take();
        assert_eq!(1, records.len());

        let record = &records[0];

        assert_eq!(Some(string("entering loop")), record.body);
        assert_eq!(
            Some(UNIX_EPOCH + Duration::from_millis(1_718_000_000_123)),
            record.timestamp
        );
        assert_eq!(Some(logs::Severity::Trace), record.severity_number);
        assert_eq!(Some("FINEST"), record.severity_text.as_deref());
        assert!(record.trace_context.is_none());

        assert_eq!(Some(&string("diag_trace")), attribute(record, KEY_TYPE));
        assert_eq!(Some(&AnyValue::Int(42)), attribute(record, KEY_THREAD_ID));
        assert_eq!(
            Some(&AnyValue::Int(3)),
            attribute(record, "diag.ext.retrycount_int")
        );
        assert_eq!(
            Some(&AnyValue::Double(0.25)),
            attribute(record, "diag.ext.ratio_float")
        );
        assert_eq!(
            Some(&AnyValue::Boolean(true)),
            attribute(record, "diag.ext.cached_bool")
        );
    }

    #[test]
    fn setup_exports_to_global_logger_provider() {
        let provider = CapturingLoggerProvider::default();
        let _ = global::set_logger_provider(provider.clone());

        let bridge = setup()
            .process(ProcessInfo::new("defaultServer", "/srv/usr"))
            .build();

        let evt = DiagnosticEvent::from(MessageEvent {
            level: "WARNING".into(),
            message: "pool exhausted".into(),
            ..Default::default()
        });

        assert_eq!(
            Outcome::Emitted,
            bridge
                .handle("diagnostics.source.message", Location::Memory, &evt)
                .unwrap()
        );

        assert!(provider
            .names
            .lock()
            .unwrap()
            .iter()
            .any(|name| name == LOGGER_NAME));

        let records = provider.logger.take();
        assert_eq!(1, records.len());

        assert_eq!(Some(string("pool exhausted")), records[0].body);
        assert_eq!(Some(logs::Severity::Warn), records[0].severity_number);
        assert_eq!(
            Some(&string("defaultServer")),
            attribute(&records[0], KEY_SERVER_NAME)
        );
    }

    #[test]
    fn exporter_leaves_failure_severity_unset() {
        let logger = CapturingLogger::default();

        let bridge = diag_bridge::setup()
            .process(ProcessInfo::new("defaultServer", "/srv/usr"))
            .exporter(OpenTelemetryExporter::from_logger(logger.clone()))
            .build();

        let evt = DiagnosticEvent::from(FailureCapture {
            timestamp_millis: 1_718_000_000_500,
            exception_name: Some("java.lang.IllegalStateException".into()),
            message: Some("pool closed".into()),
            ..Default::default()
        });

        bridge
            .handle("diagnostics.source.ffdc", Location::Memory, &evt)
            .unwrap();

        let records = logger.take();
        let record = &records[0];

        assert_eq!(None, record.severity_number);
        assert_eq!(None, record.severity_text);
        assert_eq!(
            Some(&string("java.lang.IllegalStateException")),
            attribute(record, KEY_EXCEPTION_TYPE)
        );
    }

    #[test]
    fn ctxt_reads_active_span() {
        let provider = opentelemetry_sdk::trace::TracerProvider::builder().build();
        let tracer = provider.tracer("diag_bridge_opentelemetry_test");

        let logger = CapturingLogger::default();

        let bridge = diag_bridge::setup()
            .process(ProcessInfo::new("defaultServer", "/srv/usr"))
            .exporter(OpenTelemetryExporter::from_logger(logger.clone()))
            .ctxt(OpenTelemetryCtxt::new())
            .build();

        let evt = DiagnosticEvent::from(MessageEvent {
            level: "INFO".into(),
            message: "order placed".into(),
            ..Default::default()
        });

        bridge
            .handle("diagnostics.source.message", Location::Memory, &evt)
            .unwrap();

        let (trace_id, span_id) = tracer.in_span("place_order", |cx| {
            let span_context = cx.span().span_context().clone();

            bridge
                .handle("diagnostics.source.message", Location::Memory, &evt)
                .unwrap();

            (span_context.trace_id(), span_context.span_id())
        });

        let records = logger.take();
        assert_eq!(2, records.len());

        // Outside of a span there's no trace context
        assert!(records[0].trace_context.is_none());

        let trace_context = records[1].trace_context.as_ref().unwrap();

        assert_eq!(trace_id, trace_context.trace_id);
        assert_eq!(span_id, trace_context.span_id);
    }

    #[test]
    fn ctxt_outside_span_is_empty() {
        assert_eq!(None, diag_bridge::Ctxt::current(&OpenTelemetryCtxt::new()));
    }
}
