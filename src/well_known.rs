/*!
Attribute keys attached to mapped records.

Keys owned by the bridge are namespaced under [`NAMESPACE`]. Thread and exception details use the OpenTelemetry semantic conventions.
*/

/**
The namespace of attributes owned by the bridge.
*/
pub const NAMESPACE: &str = "diag.";
/**
The namespace of attributes decoded from event extensions.
*/
pub const EXT_NAMESPACE: &str = "diag.ext.";

pub const KEY_TYPE: &str = "diag.type";
pub const KEY_USER_DIR: &str = "diag.user_dir";
pub const KEY_SERVER_NAME: &str = "diag.server_name";
pub const KEY_SEQUENCE: &str = "diag.sequence";
pub const KEY_CLASS_NAME: &str = "diag.class_name";

pub const KEY_MESSAGE_ID: &str = "diag.message_id";
pub const KEY_MODULE: &str = "diag.module";
pub const KEY_METHOD_NAME: &str = "diag.method_name";

pub const KEY_PROBE_ID: &str = "diag.probe_id";
pub const KEY_OBJECT_DETAILS: &str = "diag.object_details";

pub const KEY_EXT_APP_NAME: &str = "diag.ext.app_name";

pub const KEY_THREAD_NAME: &str = "thread.name";
pub const KEY_THREAD_ID: &str = "thread.id";
pub const KEY_EXCEPTION_TYPE: &str = "exception.type";
pub const KEY_EXCEPTION_MESSAGE: &str = "exception.message";
pub const KEY_EXCEPTION_STACKTRACE: &str = "exception.stacktrace";

/**
The extension carrying the name of the application that produced an event.
*/
pub const EXT_APP_NAME: &str = "ext_appName";
/**
The extension carrying the thread name, which duplicates [`KEY_THREAD_NAME`].
*/
pub const EXT_THREAD: &str = "ext_thread";
/**
The prefix applications put on extension keys.
*/
pub const EXT_PREFIX: &str = "ext_";

pub const LVL_ENTRY: &str = "ENTRY";
pub const LVL_EXIT: &str = "EXIT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_keys_are_namespaced() {
        assert!(EXT_NAMESPACE.starts_with(NAMESPACE));
        assert!(KEY_EXT_APP_NAME.starts_with(EXT_NAMESPACE));

        for key in [
            KEY_TYPE,
            KEY_USER_DIR,
            KEY_SERVER_NAME,
            KEY_SEQUENCE,
            KEY_CLASS_NAME,
            KEY_MESSAGE_ID,
            KEY_MODULE,
            KEY_METHOD_NAME,
            KEY_PROBE_ID,
            KEY_OBJECT_DETAILS,
        ] {
            assert!(key.starts_with(NAMESPACE), "{}", key);
        }

        for key in [
            KEY_THREAD_NAME,
            KEY_THREAD_ID,
            KEY_EXCEPTION_TYPE,
            KEY_EXCEPTION_MESSAGE,
            KEY_EXCEPTION_STACKTRACE,
        ] {
            assert!(!key.starts_with(NAMESPACE), "{}", key);
        }
    }
}
