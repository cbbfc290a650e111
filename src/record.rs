/*!
The [`TelemetryLogRecord`] type.
*/

use std::{
    borrow::Cow,
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use emit::span::{SpanId, TraceId};

use crate::severity::Severity;

/**
A structured log record produced by the bridge.

Records are built fresh for each diagnostic event and handed to an [`crate::Exporter`] by value.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryLogRecord {
    body: Option<String>,
    timestamp: SystemTime,
    severity: Option<Severity>,
    severity_text: Option<String>,
    attributes: Vec<(Key, AttributeValue)>,
    trace_context: Option<TraceContext>,
}

/**
The key of an attribute on a [`TelemetryLogRecord`].
*/
pub type Key = Cow<'static, str>;

/**
The value of an attribute on a [`TelemetryLogRecord`].
*/
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /**
    A signed integer.
    */
    Int(i64),
    /**
    A floating point number.
    */
    Float(f64),
    /**
    A boolean.
    */
    Bool(bool),
    /**
    A string.
    */
    Str(String),
}

/**
The trace and span active when a record was mapped.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    /**
    The id of the active trace.
    */
    pub trace_id: TraceId,
    /**
    The id of the active span.
    */
    pub span_id: SpanId,
    /**
    W3C trace flags, like `0x01` for sampled.
    */
    pub trace_flags: u8,
}

impl TelemetryLogRecord {
    /**
    Create an empty record for the given timestamp.
    */
    pub fn new(timestamp: SystemTime) -> Self {
        TelemetryLogRecord {
            body: None,
            timestamp,
            severity: None,
            severity_text: None,
            attributes: Vec::new(),
            trace_context: None,
        }
    }

    /**
    The body of the record.
    */
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /**
    The time the underlying event was produced.
    */
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /**
    The time the underlying event was produced, in milliseconds since the Unix epoch.
    */
    pub fn timestamp_millis(&self) -> i64 {
        match self.timestamp.duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_millis() as i64,
            Err(err) => -(err.duration().as_millis() as i64),
        }
    }

    /**
    The severity of the record.
    */
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    /**
    The original severity label of the underlying event.
    */
    pub fn severity_text(&self) -> Option<&str> {
        self.severity_text.as_deref()
    }

    /**
    The attributes of the record, in the order they were added.
    */
    pub fn attributes(&self) -> &[(Key, AttributeValue)] {
        &self.attributes
    }

    /**
    Get the value of the attribute with the given key.
    */
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /**
    The trace and span active when the record was mapped.
    */
    pub fn trace_context(&self) -> Option<&TraceContext> {
        self.trace_context.as_ref()
    }

    /**
    Split the record into its parts.
    */
    pub fn into_parts(self) -> RecordParts {
        RecordParts {
            body: self.body,
            timestamp: self.timestamp,
            severity: self.severity,
            severity_text: self.severity_text,
            attributes: self.attributes,
            trace_context: self.trace_context,
        }
    }

    pub(crate) fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub(crate) fn set_severity(&mut self, severity: Severity, text: Option<&str>) {
        self.severity = Some(severity);
        self.severity_text = text.map(ToOwned::to_owned);
    }

    pub(crate) fn set_trace_context(&mut self, trace_context: Option<TraceContext>) {
        self.trace_context = trace_context;
    }

    /**
    Add an attribute.

    A key that's already present is replaced so each key appears once.
    */
    pub(crate) fn put(&mut self, key: impl Into<Key>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();

        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /**
    Add an attribute if it has a value.
    */
    pub(crate) fn put_opt(&mut self, key: impl Into<Key>, value: Option<impl Into<AttributeValue>>) {
        if let Some(value) = value {
            self.put(key, value);
        }
    }
}

/**
The owned parts of a [`TelemetryLogRecord`].

Exporters that convert records into another representation can use [`TelemetryLogRecord::into_parts`] to move fields out without cloning them.
*/
#[derive(Debug)]
pub struct RecordParts {
    /**
    The body of the record.
    */
    pub body: Option<String>,
    /**
    The time the underlying event was produced.
    */
    pub timestamp: SystemTime,
    /**
    The severity of the record.
    */
    pub severity: Option<Severity>,
    /**
    The original severity label of the underlying event.
    */
    pub severity_text: Option<String>,
    /**
    The attributes of the record.
    */
    pub attributes: Vec<(Key, AttributeValue)>,
    /**
    The trace and span active when the record was mapped.
    */
    pub trace_context: Option<TraceContext>,
}

/**
Convert a millisecond Unix timestamp into a [`SystemTime`].
*/
pub(crate) fn system_time_from_millis(millis: i64) -> SystemTime {
    let offset = Duration::from_millis(millis.unsigned_abs());

    if millis >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => fmt::Display::fmt(v, f),
            AttributeValue::Float(v) => fmt::Display::fmt(v, f),
            AttributeValue::Bool(v) => fmt::Display::fmt(v, f),
            AttributeValue::Str(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Str(v)
    }
}

impl<'a> From<&'a str> for AttributeValue {
    fn from(v: &'a str) -> Self {
        AttributeValue::Str(v.to_owned())
    }
}

impl<'a> From<&'a String> for AttributeValue {
    fn from(v: &'a String) -> Self {
        AttributeValue::Str(v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_millis_roundtrip() {
        for millis in [0, 1, 1_718_000_000_123, -1_500] {
            let record = TelemetryLogRecord::new(system_time_from_millis(millis));

            assert_eq!(millis, record.timestamp_millis());
        }
    }

    #[test]
    fn put_replaces_existing_key() {
        let mut record = TelemetryLogRecord::new(UNIX_EPOCH);

        record.put("a", 1i64);
        record.put("b", true);
        record.put("a", "one");

        assert_eq!(2, record.attributes().len());
        assert_eq!(Some(&AttributeValue::Str("one".into())), record.attribute("a"));
        assert_eq!("a", record.attributes()[0].0);
    }

    #[test]
    fn put_opt_skips_missing_values() {
        let mut record = TelemetryLogRecord::new(UNIX_EPOCH);

        record.put_opt("missing", None::<String>);
        record.put_opt("present", Some("value"));

        assert_eq!(None, record.attribute("missing"));
        assert_eq!(
            Some(&AttributeValue::Str("value".into())),
            record.attribute("present")
        );
    }
}
