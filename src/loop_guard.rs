/*!
Detecting events the bridge produced itself.

When records are written to a console or log file through an OpenTelemetry logging exporter, the host can capture that output as a new diagnostic event. Re-exporting it would feed back into the exporter forever, so those events are recognized by a marker the exporter writes and dropped.
*/

use crate::event::DiagnosticEvent;

/**
The marker written by the OpenTelemetry logging exporter when it renders a record.
*/
pub const MARKER: &str = "scopeInfo:";

/**
Whether an event is the rendered output of a record the bridge already exported.
*/
pub fn is_bridge_artifact(evt: &DiagnosticEvent) -> bool {
    evt.body().is_some_and(|body| body.contains(MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FailureCapture, MessageEvent};

    #[test]
    fn detects_marker_in_messages() {
        let artifact = DiagnosticEvent::from(MessageEvent {
            level: "SystemOut".into(),
            message: "2024-06-10T08:00:00Z INFO 'order placed' : scopeInfo: io.opentelemetry.orders".into(),
            ..Default::default()
        });

        let plain = DiagnosticEvent::from(MessageEvent {
            level: "INFO".into(),
            message: "order placed".into(),
            ..Default::default()
        });

        assert!(is_bridge_artifact(&artifact));
        assert!(!is_bridge_artifact(&plain));
    }

    #[test]
    fn detects_marker_in_failure_captures() {
        let artifact = DiagnosticEvent::from(FailureCapture {
            message: Some("exporter failed for scopeInfo: orders".into()),
            ..Default::default()
        });

        let empty = DiagnosticEvent::from(FailureCapture::default());

        assert!(is_bridge_artifact(&artifact));
        assert!(!is_bridge_artifact(&empty));
    }
}
