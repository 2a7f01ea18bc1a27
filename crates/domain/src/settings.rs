//! Installation-wide settings.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Singleton settings record. Only stored and served; the broker address is
/// not used by any logic in this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub broker_ip: IpAddr,
}
