// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for checkout staff.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses four severity levels that drive UI presentation.

use crate::error::PosError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Busy printer, slow handshake — trying again later is fine.
    Transient,
    /// Operator must do something (load paper, close cover, reboot terminal).
    ActionRequired,
    /// The request itself is wrong; retrying changes nothing.
    Permanent,
    /// A consumable has run out (paper roll).
    BuyRequired,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the operator should try (shown as body text).
    pub suggestion: String,
    /// Whether the caller may safely resubmit without checking the paper.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `PosError` into a `HumanError` a cashier can act on.
pub fn humanize_error(err: &PosError) -> HumanError {
    match err {
        PosError::NotInitialized(what) => HumanError {
            message: format!("The {} isn't ready yet.", what.to_ascii_lowercase()),
            suggestion: "Wait for the terminal to finish starting up, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PosError::Validation(detail) => HumanError {
            message: "Something on this receipt can't be printed.".into(),
            suggestion: format!("Check the receipt contents and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PosError::Decode(_) => HumanError {
            message: "There's a problem with this picture.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try a PNG or JPEG."
                .into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PosError::SdkInit(code) => HumanError {
            message: "The printer service didn't start.".into(),
            suggestion: format!("Restart the app. If it keeps failing, reboot the terminal. (Code {code})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PosError::Sdk { operation, code } => HumanError {
            message: "The printer rejected a setting.".into(),
            suggestion: format!("Try again. If it keeps happening, reboot the terminal. ({operation}, code {code})"),
            retriable: true,
            severity: Severity::Transient,
        },

        PosError::External(detail) => humanize_external(detail),

        // Paper may already have moved, so nothing downstream resubmits blindly.
        PosError::PrintFailed(code) => HumanError {
            message: "The receipt didn't finish printing.".into(),
            suggestion: format!(
                "Check the paper and the printer cover, then print the receipt again if needed. (Code {code})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PosError::Busy => HumanError {
            message: "The printer is still busy with another receipt.".into(),
            suggestion: "Wait for the current receipt to finish, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PosError::Timeout { .. } => HumanError {
            message: "The printer didn't answer in time.".into(),
            suggestion: "Check whether the receipt came out before printing it again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PosError::Receipt(inner) => humanize_error(inner),

        PosError::Io(_) | PosError::Serialization(_) => HumanError {
            message: "The app couldn't read its settings.".into(),
            suggestion: "Default settings are being used. Re-save the settings to fix this.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PosError::PlatformUnavailable => HumanError {
            message: "This device has no built-in printer.".into(),
            suggestion: "Printing needs a POS terminal with a thermal printer.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Parse free-form SDK messages into human-readable ones.
fn humanize_external(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("paper") && (lower.contains("out") || lower.contains("empty")) {
        HumanError {
            message: "The printer is out of paper.".into(),
            suggestion: "Load a new paper roll, close the cover, then try again.".into(),
            retriable: false,
            severity: Severity::BuyRequired,
        }
    } else if lower.contains("overheat") || lower.contains("temperature") {
        HumanError {
            message: "The print head is too hot.".into(),
            suggestion: "Wait a minute for it to cool down, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("cover") {
        HumanError {
            message: "The printer cover is open.".into(),
            suggestion: "Close the paper cover firmly, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The printer had a problem.".into(),
            suggestion: format!("Try again. If this keeps happening, reboot the terminal. (Detail: {detail})"),
            retriable: false,
            severity: Severity::Transient,
        }
    }
}
