/*!
The [`DiagnosticEvent`] type.

Events are created by the registry when a diagnostic condition fires. The bridge only ever reads them.
*/

/**
A diagnostic event delivered by the registry.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /**
    A message or trace entry.
    */
    Message(MessageEvent),
    /**
    A first-failure diagnostic capture.
    */
    Failure(FailureCapture),
}

/**
A message or trace entry.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEvent {
    /**
    Milliseconds since the Unix epoch.
    */
    pub timestamp_millis: i64,
    /**
    The level label, like `INFO` or `FINEST`.
    */
    pub level: String,
    /**
    The severity label as the host renders it, like `I` or `3`.
    */
    pub severity: Option<String>,
    /**
    The rendered message.
    */
    pub message: String,
    /**
    The name of the thread that produced the event.
    */
    pub thread_name: Option<String>,
    /**
    The id of the thread that produced the event.
    */
    pub thread_id: i64,
    /**
    The name of an exception attached to the event.
    */
    pub exception_name: Option<String>,
    /**
    The stack trace of an exception attached to the event.
    */
    pub throwable: Option<String>,
    /**
    The logger or module that produced the event.
    */
    pub module: Option<String>,
    /**
    The message id, like `APP0001I`.
    */
    pub message_id: Option<String>,
    /**
    The method that produced the event.
    */
    pub method_name: Option<String>,
    /**
    The class that produced the event.
    */
    pub class_name: Option<String>,
    /**
    A sequence number that orders events with the same timestamp.
    */
    pub sequence: Option<String>,
    /**
    Extension values attached by the application, in the order they were added.
    */
    pub extensions: Vec<ExtensionEntry>,
}

/**
A first-failure diagnostic capture.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureCapture {
    /**
    Milliseconds since the Unix epoch.
    */
    pub timestamp_millis: i64,
    /**
    The id of the thread the failure occurred on.
    */
    pub thread_id: i64,
    /**
    The name of the captured exception.
    */
    pub exception_name: Option<String>,
    /**
    The message of the captured exception.
    */
    pub message: Option<String>,
    /**
    The stack trace of the captured exception.
    */
    pub stacktrace: Option<String>,
    /**
    The id of the probe that captured the failure.
    */
    pub probe_id: Option<String>,
    /**
    A dump of the object the failure was captured from.
    */
    pub object_details: Option<String>,
    /**
    The class the failure was captured in.
    */
    pub class_name: Option<String>,
    /**
    A sequence number that orders events with the same timestamp.
    */
    pub sequence: Option<String>,
}

/**
A key-value pair attached to a [`MessageEvent`].

The suffix of the key determines how the value is decoded. See [`ExtensionType`].
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionEntry {
    key: String,
    value: String,
}

/**
The logical type of an extension value.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    /**
    A 32bit integer, keys ending in `_int`.
    */
    Int,
    /**
    A floating point number, keys ending in `_float`.
    */
    Float,
    /**
    A 64bit integer, keys ending in `_long`.
    */
    Long,
    /**
    A boolean, keys ending in `_bool`.
    */
    Bool,
    /**
    A string, any other key.
    */
    String,
}

const INT_SUFFIX: &str = "_int";
const FLOAT_SUFFIX: &str = "_float";
const LONG_SUFFIX: &str = "_long";
const BOOL_SUFFIX: &str = "_bool";

impl DiagnosticEvent {
    /**
    The body of the event.

    For failure captures this is the message of the captured exception.
    */
    pub fn body(&self) -> Option<&str> {
        match self {
            DiagnosticEvent::Message(evt) => Some(&evt.message),
            DiagnosticEvent::Failure(evt) => evt.message.as_deref(),
        }
    }

    /**
    The time the event was produced, in milliseconds since the Unix epoch.
    */
    pub fn timestamp_millis(&self) -> i64 {
        match self {
            DiagnosticEvent::Message(evt) => evt.timestamp_millis,
            DiagnosticEvent::Failure(evt) => evt.timestamp_millis,
        }
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            DiagnosticEvent::Message(_) => "message",
            DiagnosticEvent::Failure(_) => "failure capture",
        }
    }
}

impl From<MessageEvent> for DiagnosticEvent {
    fn from(evt: MessageEvent) -> Self {
        DiagnosticEvent::Message(evt)
    }
}

impl From<FailureCapture> for DiagnosticEvent {
    fn from(evt: FailureCapture) -> Self {
        DiagnosticEvent::Failure(evt)
    }
}

impl ExtensionEntry {
    /**
    Create an extension entry.
    */
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        ExtensionEntry {
            key: key.into(),
            value: value.into(),
        }
    }

    /**
    The key of the extension, including its type suffix.
    */
    pub fn key(&self) -> &str {
        &self.key
    }

    /**
    The raw value of the extension.
    */
    pub fn value(&self) -> &str {
        &self.value
    }

    /**
    The type of the value, determined by the suffix of its key.
    */
    pub fn value_type(&self) -> ExtensionType {
        ExtensionType::of_key(&self.key)
    }
}

impl ExtensionType {
    /**
    Get the type encoded in the suffix of an extension key.

    Suffixes are matched without regard to case, so `_INT` and `_int` are the same type.
    */
    pub fn of_key(key: &str) -> Self {
        let key = key.to_ascii_lowercase();

        if key.ends_with(INT_SUFFIX) {
            ExtensionType::Int
        } else if key.ends_with(FLOAT_SUFFIX) {
            ExtensionType::Float
        } else if key.ends_with(LONG_SUFFIX) {
            ExtensionType::Long
        } else if key.ends_with(BOOL_SUFFIX) {
            ExtensionType::Bool
        } else {
            ExtensionType::String
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_type_from_suffix() {
        for (key, expected) in [
            ("ext_retryCount_int", ExtensionType::Int),
            ("ext_ratio_float", ExtensionType::Float),
            ("ext_bytes_long", ExtensionType::Long),
            ("ext_cached_bool", ExtensionType::Bool),
            ("ext_user", ExtensionType::String),
            ("ext_integer", ExtensionType::String),
            ("int", ExtensionType::String),
            ("ext_retryCount_INT", ExtensionType::Int),
            ("ext_cached_Bool", ExtensionType::Bool),
        ] {
            assert_eq!(expected, ExtensionType::of_key(key), "{}", key);
        }
    }

    #[test]
    fn extension_type_ignores_value() {
        assert_eq!(
            ExtensionType::String,
            ExtensionEntry::new("ext_count", "42").value_type()
        );
        assert_eq!(
            ExtensionType::Int,
            ExtensionEntry::new("ext_count_int", "forty-two").value_type()
        );
    }

    #[test]
    fn failure_body_is_exception_message() {
        let evt = DiagnosticEvent::from(FailureCapture {
            message: Some("connection reset".into()),
            ..Default::default()
        });

        assert_eq!(Some("connection reset"), evt.body());
        assert_eq!(None, DiagnosticEvent::from(FailureCapture::default()).body());
    }
}
