// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for posprint.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all posprint operations.
#[derive(Debug, Error)]
pub enum PosError {
    // -- Lifecycle --
    /// The SDK handshake has not completed (or failed) for this component.
    #[error("{0} not initialized")]
    NotInitialized(&'static str),

    // -- Caller input --
    #[error("{0}")]
    Validation(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    // -- Vendor SDK --
    #[error("SDK initialization failed with code: {0}")]
    SdkInit(i32),

    #[error("{operation} failed with code: {code}")]
    Sdk { operation: &'static str, code: i32 },

    #[error("{0}")]
    External(String),

    #[error("printing failed with error code: {0}")]
    PrintFailed(i32),

    // -- Submission --
    #[error("printer is busy with another job")]
    Busy,

    #[error("{operation} did not complete within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Receipt printing failed: {0}")]
    Receipt(Box<PosError>),

    // -- Persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform --
    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl PosError {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True when the error was raised before anything reached the device:
    /// bad input, missing handshake, or another job holding the printer.
    pub fn is_rejected_before_device(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Decode(_) | Self::NotInitialized(_) | Self::Busy => true,
            Self::Receipt(inner) => inner.is_rejected_before_device(),
            _ => false,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_bridge_contract() {
        assert_eq!(
            PosError::NotInitialized("Printer").to_string(),
            "Printer not initialized"
        );
        assert_eq!(
            PosError::Sdk { operation: "Init printer", code: 3 }.to_string(),
            "Init printer failed with code: 3"
        );
        assert_eq!(
            PosError::SdkInit(-7).to_string(),
            "SDK initialization failed with code: -7"
        );
    }

    #[test]
    fn receipt_wraps_cause() {
        let err = PosError::Receipt(Box::new(PosError::validation("Text is required")));
        assert_eq!(err.to_string(), "Receipt printing failed: Text is required");
        assert!(err.is_rejected_before_device());
    }

    #[test]
    fn device_failures_are_not_pre_device() {
        assert!(!PosError::PrintFailed(4).is_rejected_before_device());
        let timeout = PosError::Timeout {
            operation: "Print job",
            after: Duration::from_secs(60),
        };
        assert!(!timeout.is_rejected_before_device());
        assert!(PosError::Busy.is_rejected_before_device());
    }

    #[test]
    fn sub_second_timeouts_keep_their_unit() {
        let err = PosError::Timeout {
            operation: "Print job",
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Print job did not complete within 250ms");
        let err = PosError::Timeout {
            operation: "SDK initialization",
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "SDK initialization did not complete within 30s");
    }
}
