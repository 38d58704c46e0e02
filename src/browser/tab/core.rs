//! Core Tab struct and accessors.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::identifiers::{FrameId, TabId};
use crate::protocol::{Command, Request, Response};
use crate::transport::Connection;

// ============================================================================
// Types
// ============================================================================

/// Status of the last top-level document response, shared with the
/// window's response-header handler.
pub(crate) type DocumentStatus = Arc<Mutex<Option<u16>>>;

// ============================================================================
// Tab
// ============================================================================

/// A tab, scoped to one frame. Frame switches return a new `Tab`.
#[derive(Clone)]
pub struct Tab {
    pub(super) tab_id: TabId,
    pub(super) frame_id: FrameId,
    pub(super) connection: Connection,
    pub(super) document_status: DocumentStatus,
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("tab_id", &self.tab_id)
            .field("frame_id", &self.frame_id)
            .finish_non_exhaustive()
    }
}

impl Tab {
    pub(crate) fn new(
        tab_id: TabId,
        frame_id: FrameId,
        connection: Connection,
        document_status: DocumentStatus,
    ) -> Self {
        Self {
            tab_id,
            frame_id,
            connection,
            document_status,
        }
    }

    /// Returns the tab id.
    #[inline]
    #[must_use]
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Returns the frame this handle targets.
    #[inline]
    #[must_use]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Sends a command to this tab and frame.
    ///
    /// Error responses from the extension become [`Error::Protocol`](crate::Error::Protocol).
    pub(crate) async fn send_command(&self, command: Command) -> Result<Response> {
        let request = Request::new(self.tab_id, self.frame_id, command);
        self.connection.send(request).await?.into_success()
    }
}
