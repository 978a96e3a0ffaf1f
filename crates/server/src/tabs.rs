//! Tab opening for MCP clients.
//!
//! The server cannot open browser tabs itself, so opened URLs are collected
//! per call and handed back to the client in the tool output.

use std::sync::Mutex;

use async_trait::async_trait;
use tabdeck_core::{Error, TabOpener};

/// Collects URLs instead of opening them.
#[derive(Debug, Default)]
pub struct TabCollector {
    opened: Mutex<Vec<String>>,
}

impl TabCollector {
    /// URLs collected so far, in call order.
    pub fn into_opened(self) -> Vec<String> {
        self.opened.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TabOpener for TabCollector {
    async fn open_tab(&self, url: &str) -> Result<(), Error> {
        let mut opened = self.opened.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        opened.push(url.to_string());
        tracing::debug!(url, "tab requested");
        Ok(())
    }
}
