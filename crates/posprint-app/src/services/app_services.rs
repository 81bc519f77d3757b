// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads the persisted configuration and owns the
// POS session every command runs against.

use std::path::{Path, PathBuf};

use posprint_core::config::BridgeConfig;
use posprint_core::error::Result;
use posprint_print::PosSession;
use tracing::{info, warn};

use super::data_dir;

pub struct AppServices {
    session: PosSession,
    data_dir: PathBuf,
}

impl AppServices {
    /// Load config from the data directory and open a session on the
    /// platform SDK. The SDK handshake is not started here.
    pub fn init() -> Self {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_else(|| {
            info!("no usable config file, using defaults");
            BridgeConfig::default()
        });

        Self {
            session: PosSession::new(config),
            data_dir: dir,
        }
    }

    pub fn session(&self) -> &PosSession {
        &self.session
    }

    /// Run the SDK handshake.
    pub async fn connect(&self) -> Result<()> {
        info!(platform = self.session.platform_name(), "connecting to POS SDK");
        self.session.init_pos_sdk().await
    }

    pub fn config(&self) -> &BridgeConfig {
        self.session.config()
    }

    /// Write the active config to the data directory.
    pub fn save_config(&self) -> Result<PathBuf> {
        persist_config(&self.data_dir, self.session.config())
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<BridgeConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data)
        .inspect_err(|e| warn!(path = %path.display(), error = %e, "ignoring malformed config"))
        .ok()
}

fn persist_config(data_dir: &Path, config: &BridgeConfig) -> Result<PathBuf> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use posprint_core::config::BusyPolicy;

    use super::*;

    #[test]
    fn config_round_trips_through_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_config(dir.path()).is_none());

        let config = BridgeConfig {
            busy_policy: BusyPolicy::Queue,
            submit_timeout_secs: 90,
            ..Default::default()
        };
        let path = persist_config(dir.path(), &config).expect("persist");
        assert!(path.ends_with(CONFIG_FILE));

        let loaded = load_config(dir.path()).expect("load");
        assert_eq!(loaded.busy_policy, BusyPolicy::Queue);
        assert_eq!(loaded.submit_timeout_secs, 90);
        assert_eq!(loaded.init_timeout_secs, 30);
    }

    #[test]
    fn malformed_config_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").expect("write");
        assert!(load_config(dir.path()).is_none());
    }
}
