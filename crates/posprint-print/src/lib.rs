// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// posprint Print — job composition, submission and device telemetry on top
// of the vendor SDK boundary in `posprint-bridge`.

pub mod composer;
pub mod device;
pub mod picture;
pub mod receipt;
pub mod session;
pub mod settings;
pub mod status;
pub mod submission;

mod signal;

pub use composer::JobComposer;
pub use device::PosDevice;
pub use session::PosSession;
pub use settings::PrinterSettings;
pub use status::StatusAccessor;
pub use submission::SubmissionController;
