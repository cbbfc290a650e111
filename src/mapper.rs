/*!
Mapping [`DiagnosticEvent`]s onto [`TelemetryLogRecord`]s.

Mapping is deterministic and doesn't perform any IO. The only ambient state it reads is the active trace context, through the configured [`Ctxt`].
*/

use std::{env, path::PathBuf};

use emit::empty::Empty;

use crate::{
    ctxt::Ctxt,
    error::MapError,
    event::{DiagnosticEvent, ExtensionEntry, ExtensionType, FailureCapture, MessageEvent},
    record::{system_time_from_millis, AttributeValue, TelemetryLogRecord},
    severity::Severity,
    source::EventType,
    well_known::*,
};

/**
The identity of the process events are produced in.

Every mapped record carries the server name and working directory.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    server_name: String,
    user_dir: String,
}

impl ProcessInfo {
    /**
    Create process info from a server name and working directory.
    */
    pub fn new(server_name: impl Into<String>, user_dir: impl Into<String>) -> Self {
        ProcessInfo {
            server_name: server_name.into(),
            user_dir: user_dir.into(),
        }
    }

    /**
    Detect process info from the environment.

    The server name is the file stem of the current executable and the user directory is the current working directory. Either is empty if it can't be determined.
    */
    pub fn from_env() -> Self {
        let server_name = env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .unwrap_or_default();

        let user_dir = env::current_dir()
            .map(|dir: PathBuf| dir.to_string_lossy().into_owned())
            .unwrap_or_default();

        ProcessInfo {
            server_name,
            user_dir,
        }
    }

    /**
    The name of the server.
    */
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /**
    The working directory of the server.
    */
    pub fn user_dir(&self) -> &str {
        &self.user_dir
    }
}

impl Default for ProcessInfo {
    fn default() -> Self {
        ProcessInfo::from_env()
    }
}

/**
Maps diagnostic events onto telemetry log records.
*/
pub struct Mapper<C = Empty> {
    process: ProcessInfo,
    ctxt: C,
}

impl Mapper {
    /**
    Create a mapper that doesn't capture any trace context.
    */
    pub fn new(process: ProcessInfo) -> Self {
        Mapper {
            process,
            ctxt: Empty,
        }
    }
}

impl<C> Mapper<C> {
    /**
    Capture the trace context of mapped records from the given [`Ctxt`].
    */
    pub fn with_ctxt<U>(self, ctxt: U) -> Mapper<U> {
        Mapper {
            process: self.process,
            ctxt,
        }
    }

    /**
    The process info attached to records.
    */
    pub fn process(&self) -> &ProcessInfo {
        &self.process
    }
}

impl<C: Ctxt> Mapper<C> {
    /**
    Map an event classified as `event_type` into a record.

    Message and trace types must carry a [`DiagnosticEvent::Message`] and the failure type must carry a [`DiagnosticEvent::Failure`]. Any other combination returns a [`MapError`] without producing a record.
    */
    pub fn map(
        &self,
        evt: &DiagnosticEvent,
        event_type: EventType,
    ) -> Result<TelemetryLogRecord, MapError> {
        let mut record = match (event_type, evt) {
            (EventType::Message | EventType::Trace, DiagnosticEvent::Message(evt)) => {
                self.map_message(evt, event_type)
            }
            (EventType::Ffdc, DiagnosticEvent::Failure(evt)) => self.map_failure(evt, event_type),
            (event_type, evt) => return Err(MapError::new(event_type, evt.variant_name())),
        };

        record.set_trace_context(self.ctxt.current());

        Ok(record)
    }

    fn map_message(&self, evt: &MessageEvent, event_type: EventType) -> TelemetryLogRecord {
        let mut record = TelemetryLogRecord::new(system_time_from_millis(evt.timestamp_millis));

        if evt.level == LVL_ENTRY || evt.level == LVL_EXIT {
            record.set_body(collapse_continuations(&evt.message));
        } else {
            record.set_body(evt.message.as_str());
        }

        record.set_severity(Severity::from_level(&evt.level), evt.severity.as_deref());

        record.put_opt(KEY_THREAD_NAME, evt.thread_name.as_ref());
        record.put(KEY_THREAD_ID, evt.thread_id);

        if let (Some(exception_name), Some(throwable)) = (&evt.exception_name, &evt.throwable) {
            record.put(KEY_EXCEPTION_TYPE, exception_name);
            record.put(KEY_EXCEPTION_STACKTRACE, throwable);
        }

        self.put_common(&mut record, event_type);
        record.put_opt(KEY_MESSAGE_ID, evt.message_id.as_ref());
        record.put_opt(KEY_METHOD_NAME, evt.method_name.as_ref());
        record.put_opt(KEY_MODULE, evt.module.as_ref());
        record.put_opt(KEY_CLASS_NAME, evt.class_name.as_ref());
        record.put_opt(KEY_SEQUENCE, evt.sequence.as_ref());

        for ext in &evt.extensions {
            put_extension(&mut record, ext);
        }

        record
    }

    fn map_failure(&self, evt: &FailureCapture, event_type: EventType) -> TelemetryLogRecord {
        let mut record = TelemetryLogRecord::new(system_time_from_millis(evt.timestamp_millis));

        if let Some(ref message) = evt.message {
            record.set_body(message.as_str());
        }

        record.put(KEY_THREAD_ID, evt.thread_id);

        record.put_opt(KEY_EXCEPTION_TYPE, evt.exception_name.as_ref());
        record.put_opt(KEY_EXCEPTION_MESSAGE, evt.message.as_ref());
        record.put_opt(KEY_EXCEPTION_STACKTRACE, evt.stacktrace.as_ref());

        self.put_common(&mut record, event_type);
        record.put_opt(KEY_PROBE_ID, evt.probe_id.as_ref());
        record.put_opt(KEY_OBJECT_DETAILS, evt.object_details.as_ref());
        record.put_opt(KEY_CLASS_NAME, evt.class_name.as_ref());
        record.put_opt(KEY_SEQUENCE, evt.sequence.as_ref());

        record
    }

    fn put_common(&self, record: &mut TelemetryLogRecord, event_type: EventType) {
        record.put(KEY_TYPE, event_type.as_str());
        record.put(KEY_USER_DIR, self.process.user_dir.as_str());
        record.put(KEY_SERVER_NAME, self.process.server_name.as_str());
    }
}

fn put_extension(record: &mut TelemetryLogRecord, ext: &ExtensionEntry) {
    match ext.key() {
        EXT_APP_NAME => {
            record.put(KEY_EXT_APP_NAME, ext.value());
            return;
        }
        // The thread name is already set from the event itself
        EXT_THREAD => return,
        _ => (),
    }

    let key = extension_key(ext.key());
    let value = decode_extension(ext);

    record.put(key, value);
}

/**
Get the namespaced attribute key for an extension key.

A leading `ext_` is removed and the rest is lowercased, so `ext_retryCount_int` becomes `diag.ext.retrycount_int`.
*/
pub fn extension_key(key: &str) -> String {
    let name = key.strip_prefix(EXT_PREFIX).unwrap_or(key);

    let mut namespaced = String::with_capacity(EXT_NAMESPACE.len() + name.len());
    namespaced.push_str(EXT_NAMESPACE);
    namespaced.push_str(&name.to_lowercase());

    namespaced
}

/**
Decode the value of an extension according to the type suffix of its key.

A value that doesn't parse as its declared type is kept as a string.
*/
pub fn decode_extension(ext: &ExtensionEntry) -> AttributeValue {
    let raw = ext.value();
    let trimmed = raw.trim();

    let decoded = match ext.value_type() {
        ExtensionType::Int => trimmed.parse::<i32>().ok().map(AttributeValue::from),
        ExtensionType::Long => trimmed.parse::<i64>().ok().map(AttributeValue::from),
        ExtensionType::Float => trimmed.parse::<f64>().ok().map(AttributeValue::from),
        ExtensionType::Bool => Some(AttributeValue::Bool(trimmed.eq_ignore_ascii_case("true"))),
        ExtensionType::String => None,
    };

    decoded.unwrap_or_else(|| AttributeValue::Str(raw.to_owned()))
}

/**
Remove the indentation from continuation lines of a multi-line message.

Newlines are kept. Only spaces at the very start of a line are removed.
*/
pub fn collapse_continuations(msg: &str) -> String {
    let mut collapsed = String::with_capacity(msg.len());
    let mut line_start = false;

    for c in msg.chars() {
        match c {
            '\n' => {
                collapsed.push(c);
                line_start = true;
            }
            ' ' if line_start => (),
            c => {
                collapsed.push(c);
                line_start = false;
            }
        }
    }

    collapsed
}
