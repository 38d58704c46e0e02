//! Viewport capture.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{BrowsingContextCommand, Command};

use super::Tab;

// ============================================================================
// Tab - Screenshot
// ============================================================================

impl Tab {
    /// Captures the visible viewport as PNG bytes.
    pub async fn capture_png(&self) -> Result<Vec<u8>> {
        debug!(tab_id = %self.tab_id, "Capturing screenshot");

        let command = Command::BrowsingContext(BrowsingContextCommand::CaptureScreenshot {
            format: "png".to_string(),
            quality: None,
        });
        let response = self.send_command(command).await?;

        let data = response
            .result_str("data")
            .ok_or_else(|| Error::protocol("No screenshot data in response"))?;

        Base64Standard
            .decode(data)
            .map_err(|e| Error::protocol(format!("Invalid screenshot data: {e}")))
    }

    /// Captures the viewport and writes it to `path`, creating parent
    /// directories and overwriting any existing file.
    pub async fn save_png(&self, path: &Path) -> Result<()> {
        let bytes = self.capture_png().await?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;

        debug!(path = %path.display(), "Screenshot saved");
        Ok(())
    }
}
