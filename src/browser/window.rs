//! Browser window: one Firefox process, one connection, one profile.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::driver::Profile;
use crate::driver::core::ProcessGuard;
use crate::error::Result;
use crate::identifiers::{FrameId, SessionId, TabId};
use crate::protocol::{Command, Event, EventReply, NetworkCommand, ParsedEvent};
use crate::transport::Connection;

use super::Tab;
use super::tab::DocumentStatus;

const RESPONSE_HEADERS: &str = "network.responseHeaders";

// ============================================================================
// Window
// ============================================================================

/// A launched Firefox window. The process is killed on [`close`](Self::close)
/// or drop; the profile directory is removed on drop.
pub struct Window {
    session_id: SessionId,
    tab_id: TabId,
    connection: Connection,
    process: ProcessGuard,
    document_status: DocumentStatus,
    _profile: Profile,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("session_id", &self.session_id)
            .field("tab_id", &self.tab_id)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Wraps a connected process and starts observing document responses.
    pub(crate) async fn open(
        connection: Connection,
        process: ProcessGuard,
        profile: Profile,
        session_id: SessionId,
        tab_id: TabId,
    ) -> Result<Self> {
        let window = Self {
            session_id,
            tab_id,
            connection,
            process,
            document_status: Arc::new(Mutex::new(None)),
            _profile: profile,
        };

        window.watch_document_status().await?;
        debug!(%session_id, %tab_id, "Window ready");
        Ok(window)
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the initial tab, scoped to its top-level frame.
    #[must_use]
    pub fn tab(&self) -> Tab {
        Tab::new(
            self.tab_id,
            FrameId::main(),
            self.connection.clone(),
            Arc::clone(&self.document_status),
        )
    }

    /// Closes the connection and kills Firefox.
    pub async fn close(mut self) {
        debug!(session_id = %self.session_id, "Closing window");
        self.connection.shutdown();
        self.process.kill().await;
        info!(session_id = %self.session_id, "Window closed");
    }

    /// Records the status of every top-level document response and lets
    /// all responses through unchanged.
    async fn watch_document_status(&self) -> Result<()> {
        let status = Arc::clone(&self.document_status);

        self.connection.set_event_handler(
            RESPONSE_HEADERS,
            Box::new(move |event: Event| {
                let parsed = event.parse();
                if parsed.is_document_response()
                    && let ParsedEvent::ResponseHeaders { status: code, url, .. } = &parsed
                {
                    debug!(%url, status = code, "Document response");
                    *status.lock() = Some(*code);
                }
                Some(EventReply::allow(event.id, RESPONSE_HEADERS))
            }),
        );

        let command = Command::Network(NetworkCommand::AddIntercept {
            intercept_requests: false,
            intercept_responses: true,
        });
        let response = self.tab().send_command(command).await?;
        debug!(intercept_id = ?response.result_str("interceptId"), "Response intercept installed");
        Ok(())
    }
}
