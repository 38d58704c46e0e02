//! Frame switching.

use tracing::debug;

use crate::browser::Element;
use crate::error::{Error, Result};
use crate::identifiers::FrameId;
use crate::protocol::{BrowsingContextCommand, Command};

use super::Tab;

// ============================================================================
// Tab - Frame Switching
// ============================================================================

impl Tab {
    /// Returns a tab handle scoped to the document inside `iframe`.
    pub async fn switch_to_frame(&self, iframe: &Element) -> Result<Tab> {
        debug!(tab_id = %self.tab_id, element_id = %iframe.id(), "Switching to frame");

        let command = Command::BrowsingContext(BrowsingContextCommand::SwitchToFrame {
            element_id: iframe.id().clone(),
        });
        let response = self.send_command(command).await?;

        let frame_id = response
            .result_u64("frameId")
            .ok_or_else(|| Error::protocol("No frameId in response"))?;

        Ok(Tab::new(
            self.tab_id,
            FrameId::new(frame_id),
            self.connection.clone(),
            self.document_status.clone(),
        ))
    }
}
