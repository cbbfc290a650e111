/*!
The [`Severity`] scale of telemetry log records.

Diagnostic events carry a level label from the host's own level taxonomy. [`Severity::from_level`] translates that label into the fixed scale used by telemetry consumers.
*/

use core::fmt;

/**
The severity of a [`crate::TelemetryLogRecord`].

Variants are ordered from least to most severe.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /**
    The most detailed tracing output.
    */
    Trace,
    /**
    Detailed debugging output.
    */
    Debug,
    /**
    Debugging output, slightly more significant than [`Severity::Debug`].
    */
    Debug2,
    /**
    Debugging output, slightly more significant than [`Severity::Debug2`].
    */
    Debug3,
    /**
    Configuration and other debugging output, the most significant debug severity.
    */
    Debug4,
    /**
    Informational output.
    */
    Info,
    /**
    Informational output that should be retained, like audit records.
    */
    Info2,
    /**
    A potential problem.
    */
    Warn,
    /**
    An error.
    */
    Error,
    /**
    An error that's likely to stop the process.
    */
    Fatal,
}

/**
The severity given to level labels that aren't recognized.
*/
pub const DEFAULT_SEVERITY: Severity = Severity::Info;

impl Severity {
    /**
    Translate a diagnostic level label into a severity.

    Labels are matched exactly. The console aliases `SystemOut` and `SystemErr` map to [`Severity::Info`] and [`Severity::Warn`]. Any label that isn't recognized maps to [`DEFAULT_SEVERITY`].
    */
    pub fn from_level(level: &str) -> Severity {
        match level {
            "FATAL" => Severity::Fatal,
            "SEVERE" | "ERROR" => Severity::Error,
            "WARNING" | "SystemErr" => Severity::Warn,
            "AUDIT" => Severity::Info2,
            "INFO" | "SystemOut" => Severity::Info,
            "CONFIG" => Severity::Debug4,
            "DETAIL" => Severity::Debug3,
            "FINE" | "EVENT" => Severity::Debug2,
            "FINER" | "ENTRY" | "EXIT" => Severity::Debug,
            "FINEST" => Severity::Trace,
            _ => DEFAULT_SEVERITY,
        }
    }

    /**
    The short name of the severity, like `INFO2`.
    */
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Debug2 => "DEBUG2",
            Severity::Debug3 => "DEBUG3",
            Severity::Debug4 => "DEBUG4",
            Severity::Info => "INFO",
            Severity::Info2 => "INFO2",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /**
    The OpenTelemetry severity number.
    */
    pub const fn number(&self) -> u8 {
        match self {
            Severity::Trace => 1,
            Severity::Debug => 5,
            Severity::Debug2 => 6,
            Severity::Debug3 => 7,
            Severity::Debug4 => 8,
            Severity::Info => 9,
            Severity::Info2 => 10,
            Severity::Warn => 13,
            Severity::Error => 17,
            Severity::Fatal => 21,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        DEFAULT_SEVERITY
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels() {
        for (level, expected) in [
            ("FATAL", Severity::Fatal),
            ("SEVERE", Severity::Error),
            ("ERROR", Severity::Error),
            ("WARNING", Severity::Warn),
            ("AUDIT", Severity::Info2),
            ("INFO", Severity::Info),
            ("CONFIG", Severity::Debug4),
            ("DETAIL", Severity::Debug3),
            ("FINE", Severity::Debug2),
            ("EVENT", Severity::Debug2),
            ("FINER", Severity::Debug),
            ("ENTRY", Severity::Debug),
            ("EXIT", Severity::Debug),
            ("FINEST", Severity::Trace),
        ] {
            assert_eq!(expected, Severity::from_level(level), "{}", level);
        }
    }

    #[test]
    fn console_aliases() {
        // Redirected stderr is a warning, not an error, and stdout is plain info
        assert_eq!(Severity::Warn, Severity::from_level("SystemErr"));
        assert_eq!(Severity::Info, Severity::from_level("SystemOut"));
    }

    #[test]
    fn unknown_level_is_info() {
        for level in ["", "finest", "VERBOSE", "Info ", "FATAL!"] {
            for _ in 0..3 {
                assert_eq!(Severity::Info, Severity::from_level(level), "{:?}", level);
            }
        }

        assert_ne!(Severity::Fatal, Severity::from_level("UNKNOWN"));
    }

    #[test]
    fn numbers_increase_with_severity() {
        let all = [
            Severity::Trace,
            Severity::Debug,
            Severity::Debug2,
            Severity::Debug3,
            Severity::Debug4,
            Severity::Info,
            Severity::Info2,
            Severity::Warn,
            Severity::Error,
            Severity::Fatal,
        ];

        for pair in all.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].number() < pair[1].number());
        }

        assert_eq!("INFO2", Severity::Info2.to_string());
    }
}
