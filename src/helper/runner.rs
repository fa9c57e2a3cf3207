use std::future::Future;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use crate::error::LaunchError;

/// What a finished helper left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HelperOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a credential helper to completion.
pub trait RunHelper: Send + Sync + 'static {
    fn run(
        &self,
        executable: &str,
        args: &[String],
    ) -> impl Future<Output = Result<HelperOutput, LaunchError>> + Send;
}

/// Runs the helper as a real OS process.
///
/// No shell is involved; the environment is inherited as is, so variables
/// such as `GOOGLE_APPLICATION_CREDENTIALS` reach the helper.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl RunHelper for ProcessRunner {
    async fn run(&self, executable: &str, args: &[String]) -> Result<HelperOutput, LaunchError> {
        let mut child = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| LaunchError::from_spawn(executable, err))?;

        debug!(executable, pid = ?child.id(), "credential helper started");

        let stdout = child.stdout.take().ok_or_else(|| LaunchError::Io {
            executable: executable.to_owned(),
            message: "stdout pipe was not captured".to_owned(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| LaunchError::Io {
            executable: executable.to_owned(),
            message: "stderr pipe was not captured".to_owned(),
        })?;

        // both pipes are drained while waiting, otherwise a chatty helper
        // blocks on a full pipe and never exits
        let (stdout, stderr, status) = tokio::try_join!(
            drain(stdout),
            drain(stderr),
            child.wait(),
        )
        .map_err(|err| LaunchError::from_io(executable, err))?;

        debug!(executable, status = %status, "credential helper exited");

        Ok(HelperOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

async fn drain<R: AsyncRead + Unpin>(mut stream: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}
