// src/exec/call.rs

use tracing::{debug, info};

use crate::errors::{Result, TttError};
use crate::exec::command::{CommandSpec, Redirect};

/// Run `spec` to completion with its output going to the terminal and
/// return the exit code (`-1` when terminated by a signal).
///
/// Unlike [`streamed_call`](super::streamed_call) the caller may redirect
/// any stream; unset streams are inherited.
pub async fn call(spec: &CommandSpec) -> Result<i32> {
    let mut cmd = spec.to_command();
    cmd.stdin(spec.stdin.unwrap_or(Redirect::Inherit).to_stdio())
        .stdout(spec.stdout.unwrap_or(Redirect::Inherit).to_stdio())
        .stderr(spec.stderr.unwrap_or(Redirect::Inherit).to_stdio());

    info!(command = %spec, "running command");

    let status = cmd
        .spawn()
        .map_err(|source| TttError::Spawn {
            program: spec.program().to_string_lossy().into_owned(),
            source,
        })?
        .wait()
        .await?;

    let code = status.code().unwrap_or(-1);
    debug!(command = %spec, exit_code = code, "command exited");
    Ok(code)
}
