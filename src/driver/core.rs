//! Launches Firefox windows wired to the local WebSocket server.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::browser::Window;
use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::transport::PendingServer;

use super::assets;
use super::builder::DriverBuilder;
use super::options::FirefoxOptions;
use super::profile::{ExtensionSource, Profile};

// ============================================================================
// Driver
// ============================================================================

/// Validated launch inputs. Each [`launch`](Self::launch) starts a fresh
/// Firefox process with its own profile and connection.
#[derive(Clone)]
pub struct Driver {
    binary: PathBuf,
    extension: ExtensionSource,
    connect_timeout: Duration,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("binary", &self.binary)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Returns a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    pub(crate) fn new(
        binary: PathBuf,
        extension: ExtensionSource,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            binary,
            extension,
            connect_timeout,
        }
    }

    /// Returns the Firefox binary path.
    #[inline]
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Launches Firefox and waits for the extension to connect.
    ///
    /// The process is killed if the handshake does not complete.
    ///
    /// # Errors
    ///
    /// - [`Error::Profile`] if the profile cannot be prepared
    /// - [`Error::ProcessLaunchFailed`] if Firefox cannot be spawned
    /// - [`Error::ConnectionTimeout`] if the extension never connects
    pub async fn launch(&self, options: &FirefoxOptions) -> Result<Window> {
        let profile = Profile::new_temp()?;
        profile.install_extension(&self.extension)?;
        profile.write_prefs(&Profile::default_prefs())?;

        let session_id = SessionId::next();
        let server = PendingServer::bind_loopback().await?;
        let data_uri = assets::build_init_data_uri(&server.ws_url(), session_id);

        let child = self.spawn_firefox_process(&profile, options, &data_uri)?;
        info!(pid = ?child.id(), %session_id, port = server.port(), "Firefox process spawned");

        let guard = ProcessGuard::new(child);
        let (connection, ready) = server.accept(self.connect_timeout).await?;
        debug!(%session_id, tab_id = %ready.tab_id, "Extension connected");

        Window::open(connection, guard, profile, session_id, ready.tab_id).await
    }

    fn spawn_firefox_process(
        &self,
        profile: &Profile,
        options: &FirefoxOptions,
        data_uri: &str,
    ) -> Result<Child> {
        let mut cmd = Command::new(&self.binary);

        cmd.arg("--profile")
            .arg(profile.path())
            .arg("--no-remote")
            .arg("--new-instance")
            .args(options.to_args())
            .arg(data_uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        cmd.spawn().map_err(Error::process_launch_failed)
    }
}

// ============================================================================
// ProcessGuard
// ============================================================================

/// Kills the Firefox process when dropped.
pub(crate) struct ProcessGuard {
    child: Option<Child>,
    pid: u32,
}

impl ProcessGuard {
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Kills the process and reaps it.
    pub(crate) async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                debug!(pid = self.pid, error = %e, "Failed to kill Firefox");
            }
            info!(pid = self.pid, "Firefox process terminated");
        }
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
