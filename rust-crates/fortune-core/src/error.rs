use std::fmt;

/// Failure reported by an external collaborator (wallet, chain, social).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CollaboratorError {
    message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintErrorKind {
    /// Wallet connection was rejected or unavailable.
    ConnectionFailed,
    /// The wallet connector had no options to offer.
    NoConnectorAvailable,
    /// The wallet refused to sign or the submission call failed.
    SubmissionFailed,
    /// The transaction was submitted but did not execute successfully.
    ConfirmationFailed,
}

impl fmt::Display for MintErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MintErrorKind::ConnectionFailed => "connection failed",
            MintErrorKind::NoConnectorAvailable => "no wallet available",
            MintErrorKind::SubmissionFailed => "submission failed",
            MintErrorKind::ConfirmationFailed => "confirmation failed",
        };
        write!(f, "{name}")
    }
}

/// Error surfaced to the user through the status label.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MintError {
    pub kind: MintErrorKind,
    pub message: String,
}

impl MintError {
    pub fn new(kind: MintErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connection(err: &CollaboratorError) -> Self {
        Self::new(MintErrorKind::ConnectionFailed, err.message())
    }

    pub fn no_connector() -> Self {
        Self::new(
            MintErrorKind::NoConnectorAvailable,
            "No wallet available to connect",
        )
    }

    pub fn submission(err: &CollaboratorError) -> Self {
        Self::new(MintErrorKind::SubmissionFailed, err.message())
    }

    pub fn confirmation(err: &CollaboratorError) -> Self {
        Self::new(MintErrorKind::ConfirmationFailed, err.message())
    }
}

/// Receipt log decoding failure. Never fatal to a mint.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("event `{0}` is not described by the contract ABI")]
    UnknownEvent(String),
    #[error("malformed `{event}` log from {emitter}: {reason}")]
    Malformed {
        event: String,
        emitter: String,
        reason: String,
    },
}
