// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The process-wide POS device and its SDK handshake.
//
// `PosDevice` owns the vendor SDK object and tracks the lifecycle
//
//     Uninitialized -> Initializing -> Ready
//                                   -> Failed(code)
//
// Everything that talks to the printer goes through `printer()` / `device()`,
// which fail fast with `PosError::NotInitialized` unless the state is Ready.
// The composer, controller and status accessor share one `Arc<PosDevice>`.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use posprint_bridge::traits::{InitListener, NativeDevice, NativePrinter, PosSdk};
use posprint_core::error::{PosError, Result};
use posprint_core::types::DeviceState;

use crate::signal::Resolver;

/// Code recorded in `DeviceState::Failed` when the SDK never answered.
pub const NO_RESPONSE_CODE: i32 = -1;

/// Init listener handed to the SDK; forwards the first outcome only.
struct InitSignal {
    resolver: Resolver<std::result::Result<(), i32>>,
}

impl InitListener for InitSignal {
    fn on_init_success(&self) {
        if !self.resolver.resolve(Ok(())) {
            debug!("ignoring repeated init success");
        }
    }

    fn on_init_fail(&self, error_code: i32) {
        if !self.resolver.resolve(Err(error_code)) {
            debug!(error_code, "ignoring init failure after resolution");
        }
    }
}

/// Handles fetched from the SDK once the handshake succeeds.
struct Handles {
    printer: Option<Arc<dyn NativePrinter>>,
    device: Option<Arc<dyn NativeDevice>>,
}

/// Resets an abandoned handshake so a later call can retry it.
struct ClaimGuard<'a> {
    state: &'a watch::Sender<DeviceState>,
    armed: bool,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_if_modified(|s| {
                if *s == DeviceState::Initializing {
                    *s = DeviceState::Uninitialized;
                    true
                } else {
                    false
                }
            });
        }
    }
}

/// The single POS terminal this process drives.
pub struct PosDevice {
    sdk: Arc<dyn PosSdk>,
    state: watch::Sender<DeviceState>,
    handles: OnceLock<Handles>,
    init_timeout: Duration,
}

impl PosDevice {
    pub fn new(sdk: Arc<dyn PosSdk>, init_timeout: Duration) -> Self {
        let (state, _) = watch::channel(DeviceState::Uninitialized);
        Self {
            sdk,
            state,
            handles: OnceLock::new(),
            init_timeout,
        }
    }

    pub fn state(&self) -> DeviceState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == DeviceState::Ready
    }

    pub fn platform_name(&self) -> &str {
        self.sdk.platform_name()
    }

    /// Run the SDK handshake, or join the one already running.
    ///
    /// Idempotent once Ready. `Failed` is terminal for this handle: later
    /// calls return the same `SdkInit` code without contacting the SDK.
    #[instrument(skip(self), fields(platform = %self.sdk.platform_name()))]
    pub async fn initialize(&self) -> Result<()> {
        let mut claimed = false;
        self.state.send_if_modified(|s| {
            if *s == DeviceState::Uninitialized {
                *s = DeviceState::Initializing;
                claimed = true;
                true
            } else {
                false
            }
        });

        if !claimed {
            return self.await_settled().await;
        }

        let mut guard = ClaimGuard {
            state: &self.state,
            armed: true,
        };

        let (resolver, rx) = Resolver::channel();
        self.sdk.init_pos_sdk(Arc::new(InitSignal { resolver }));

        let outcome = tokio::time::timeout(self.init_timeout, rx).await;
        guard.armed = false;

        match outcome {
            Ok(Ok(Ok(()))) => {
                let handles = Handles {
                    printer: self.sdk.printer(),
                    device: self.sdk.device(),
                };
                if handles.printer.is_none() {
                    warn!("SDK reported success but exposes no printer");
                }
                // A second success cannot happen: only the claimant gets here.
                let _ = self.handles.set(handles);
                self.state.send_replace(DeviceState::Ready);
                info!("POS SDK initialised");
                Ok(())
            }
            Ok(Ok(Err(code))) => {
                self.state.send_replace(DeviceState::Failed(code));
                warn!(code, "POS SDK initialisation failed");
                Err(PosError::SdkInit(code))
            }
            Ok(Err(_)) => {
                self.state.send_replace(DeviceState::Failed(NO_RESPONSE_CODE));
                warn!("SDK dropped the init listener without answering");
                Err(PosError::External(
                    "SDK dropped the init listener without answering".into(),
                ))
            }
            Err(_) => {
                self.state.send_replace(DeviceState::Failed(NO_RESPONSE_CODE));
                warn!(after = ?self.init_timeout, "POS SDK initialisation timed out");
                Err(PosError::Timeout {
                    operation: "SDK initialization",
                    after: self.init_timeout,
                })
            }
        }
    }

    /// Wait for another caller's handshake and report its outcome.
    async fn await_settled(&self) -> Result<()> {
        let mut rx = self.state.subscribe();
        let settled = *rx
            .wait_for(|s| *s != DeviceState::Initializing)
            .await
            .map_err(|_| PosError::External("device handle dropped".into()))?;
        match settled {
            DeviceState::Ready => Ok(()),
            DeviceState::Failed(code) => Err(PosError::SdkInit(code)),
            DeviceState::Uninitialized | DeviceState::Initializing => {
                Err(PosError::NotInitialized("Device"))
            }
        }
    }

    /// Fail fast unless the handshake has completed.
    pub fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(PosError::NotInitialized("Printer"))
        }
    }

    pub fn printer(&self) -> Result<Arc<dyn NativePrinter>> {
        self.ensure_ready()?;
        self.handles
            .get()
            .and_then(|h| h.printer.clone())
            .ok_or(PosError::NotInitialized("Printer"))
    }

    pub fn device(&self) -> Result<Arc<dyn NativeDevice>> {
        if !self.is_ready() {
            return Err(PosError::NotInitialized("Device"));
        }
        self.handles
            .get()
            .and_then(|h| h.device.clone())
            .ok_or(PosError::NotInitialized("Device"))
    }
}

#[cfg(test)]
mod tests {
    use posprint_bridge::simulated::{InitScript, SimScript, SimulatedSdk};

    use super::*;

    fn device_with(script: SimScript) -> (SimulatedSdk, Arc<PosDevice>) {
        let sdk = SimulatedSdk::with_script(script);
        let device = Arc::new(PosDevice::new(
            Arc::new(sdk.clone()),
            Duration::from_millis(200),
        ));
        (sdk, device)
    }

    #[tokio::test]
    async fn successful_handshake_reaches_ready() {
        let (_sdk, device) = device_with(SimScript::default());
        assert_eq!(device.state(), DeviceState::Uninitialized);
        assert!(matches!(device.printer(), Err(PosError::NotInitialized(_))));

        device.initialize().await.expect("init");
        assert_eq!(device.state(), DeviceState::Ready);
        assert!(device.printer().is_ok());
        assert!(device.device().is_ok());
    }

    #[tokio::test]
    async fn failed_handshake_is_terminal() {
        let (sdk, device) = device_with(SimScript {
            init: InitScript::Fail(-12),
            ..Default::default()
        });
        let err = device.initialize().await.expect_err("fails");
        assert!(matches!(err, PosError::SdkInit(-12)));
        assert_eq!(device.state(), DeviceState::Failed(-12));

        // The SDK is not contacted again.
        let again = device.initialize().await.expect_err("still failed");
        assert!(matches!(again, PosError::SdkInit(-12)));
        assert_eq!(sdk.calls().len(), 1);
    }

    #[tokio::test]
    async fn initialize_is_idempotent_when_ready() {
        let (sdk, device) = device_with(SimScript::default());
        device.initialize().await.expect("first");
        device.initialize().await.expect("second");
        assert_eq!(sdk.calls().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_handshake() {
        let (sdk, device) = device_with(SimScript {
            init: InitScript::Hold,
            ..Default::default()
        });

        let first = tokio::spawn({
            let device = Arc::clone(&device);
            async move { device.initialize().await }
        });
        let second = tokio::spawn({
            let device = Arc::clone(&device);
            async move { device.initialize().await }
        });

        // Let both tasks reach their await points before answering.
        while device.state() != DeviceState::Initializing {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sdk.complete_init(Ok(())));

        first.await.expect("join").expect("first init");
        second.await.expect("join").expect("second init");
        assert_eq!(sdk.calls().len(), 1);
    }

    #[tokio::test]
    async fn silent_sdk_times_out() {
        let (_sdk, device) = device_with(SimScript {
            init: InitScript::Hold,
            ..Default::default()
        });
        let err = device.initialize().await.expect_err("timeout");
        assert!(matches!(err, PosError::Timeout { .. }));
        assert_eq!(
            err.to_string(),
            "SDK initialization did not complete within 200ms"
        );
        assert_eq!(device.state(), DeviceState::Failed(NO_RESPONSE_CODE));
    }

    #[tokio::test]
    async fn late_init_signal_is_ignored_after_timeout() {
        let (sdk, device) = device_with(SimScript {
            init: InitScript::Hold,
            ..Default::default()
        });
        let _ = device.initialize().await;
        assert!(sdk.complete_init(Ok(())));
        assert_eq!(device.state(), DeviceState::Failed(NO_RESPONSE_CODE));
    }
}
