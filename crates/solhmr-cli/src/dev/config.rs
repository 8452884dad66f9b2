//! Push server settings derived from [`SolhmrConfig`].

use crate::config::SolhmrConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Push server configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Address the server binds to
    pub addr: SocketAddr,
    /// Prebuilt UI served for every route the server does not handle itself
    pub ui_dir: Option<PathBuf>,
    /// Open the browser once listening
    pub open_browser: bool,
}

impl DevConfig {
    pub fn from_config(config: &SolhmrConfig) -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), config.port),
            ui_dir: config.ui_path(),
            open_browser: config.open,
        }
    }

    /// `http://127.0.0.1:<port>`
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL the browser subscribes to.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}
