//! CLI error type and process exit-code mapping.

use notesync_shared::{ErrorEnvelope, ErrorKind, redact_if_secret};
use std::fmt;

/// Process exit codes for the `notesync` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
    Remote = 4,
    Cancelled = 130,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Errors surfaced at the CLI boundary.
#[derive(Debug)]
pub enum CliError {
    Envelope(ErrorEnvelope),
    Io(std::io::Error),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Envelope(envelope) => envelope_exit_code(envelope),
            Self::Io(_) => ExitCode::Io,
        }
    }
}

fn envelope_exit_code(envelope: &ErrorEnvelope) -> ExitCode {
    if envelope.is_cancelled() {
        return ExitCode::Cancelled;
    }
    match envelope.code.namespace() {
        "config" => ExitCode::InvalidInput,
        "remote" => ExitCode::Remote,
        _ if envelope.code.code() == "io" => ExitCode::Io,
        _ if envelope.kind == ErrorKind::Expected => ExitCode::InvalidInput,
        _ => ExitCode::Internal,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Envelope(envelope) => {
                write!(formatter, "{} ({})", envelope.message, envelope.code)?;
                // Metadata may carry user-supplied values; secret keys are
                // masked before anything hits the terminal.
                for (key, value) in &envelope.metadata {
                    write!(formatter, "\n  {key}: {}", redact_if_secret(key, value))?;
                }
                Ok(())
            },
            Self::Io(error) => write!(formatter, "io error: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ErrorEnvelope> for CliError {
    fn from(envelope: ErrorEnvelope) -> Self {
        Self::Envelope(envelope)
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
