//! Tab navigation methods.

use tracing::debug;

use crate::error::Result;
use crate::protocol::{BrowsingContextCommand, Command};

use super::Tab;

// ============================================================================
// Tab - Navigation
// ============================================================================

impl Tab {
    /// Navigates and waits for the load to finish.
    ///
    /// Returns the HTTP status of the top-level document, or `None` when no
    /// intercepted response was observed (cache hit, non-HTTP scheme).
    pub async fn goto(&self, url: &str) -> Result<Option<u16>> {
        debug!(url = %url, tab_id = %self.tab_id, "Navigating");

        *self.document_status.lock() = None;

        let command = Command::BrowsingContext(BrowsingContextCommand::Navigate {
            url: url.to_string(),
        });
        self.send_command(command).await?;

        let status = *self.document_status.lock();
        debug!(tab_id = %self.tab_id, ?status, "Navigation finished");
        Ok(status)
    }

    /// Status of the most recent top-level document response.
    #[inline]
    #[must_use]
    pub fn document_status(&self) -> Option<u16> {
        *self.document_status.lock()
    }
}
