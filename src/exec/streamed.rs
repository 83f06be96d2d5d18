// src/exec/streamed.rs

//! Run a child process while delivering its output line by line.
//!
//! A child writing to a full stdout or stderr pipe blocks until someone
//! reads it, so both pipes are drained by their own tokio task from the
//! moment the child starts. The drain tasks feed one bounded channel; the
//! caller's task consumes it and hands every line to a [`LineListener`].
//!
//! Known limitation: the two pipes are read independently and merged on
//! arrival, so the relative order of stdout and stderr lines is not the
//! order the child wrote them in. stderr typically overtakes stdout written
//! "at the same time". Within one stream the order is exact.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::errors::{Result, TttError};
use crate::exec::command::CommandSpec;
use crate::types::Stream;

/// Capacity of the channel shared by the two drain tasks.
pub const QUEUE_CAPACITY: usize = 5;

/// How long the consumer waits for a line before checking whether the child
/// already exited.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// After the child exited, how long to keep collecting lines still in
/// flight from the drain tasks.
pub const EXIT_GRACE: Duration = Duration::from_millis(250);

/// Receives each line of child output as it arrives.
pub trait LineListener: Send {
    fn on_line(&mut self, stream: Stream, line: &str);
}

/// Listener writing every line straight through to this process's own
/// stdout / stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl LineListener for Passthrough {
    fn on_line(&mut self, stream: Stream, line: &str) {
        let _ = match stream {
            Stream::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{line}").and_then(|_| out.flush())
            }
            Stream::Stderr => {
                let mut err = std::io::stderr().lock();
                writeln!(err, "{line}").and_then(|_| err.flush())
            }
        };
    }
}

/// Exit code plus everything the child printed, per stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOutput {
    /// Exit code; `-1` when the child was terminated by a signal.
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CallOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug)]
enum StreamEvent {
    Line(Stream, String),
    Closed(Stream),
}

/// Run `spec`, streaming its output to `listener` (or straight through to
/// the real stdout/stderr when `None`).
///
/// The runner owns stdin and stdout of the child: a spec that redirects
/// either is rejected before anything is spawned. stderr is captured unless
/// the spec redirects it. A non-zero exit code is returned as data, not as
/// an error.
pub async fn streamed_call(
    spec: &CommandSpec,
    listener: Option<&mut dyn LineListener>,
) -> Result<CallOutput> {
    if spec.stdout.is_some() {
        return Err(TttError::ForbiddenRedirect("stdout"));
    }
    if spec.stdin.is_some() {
        return Err(TttError::ForbiddenRedirect("stdin"));
    }

    let mut passthrough = Passthrough;
    let listener: &mut dyn LineListener = match listener {
        Some(l) => l,
        None => &mut passthrough,
    };

    let mut cmd = spec.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(spec.stderr.map_or_else(Stdio::piped, |r| r.to_stdio()));

    let mut child = cmd.spawn().map_err(|source| TttError::Spawn {
        program: spec.program().to_string_lossy().into_owned(),
        source,
    })?;
    debug!(command = %spec, pid = child.id(), "spawned streamed process");

    let (tx, mut rx) = mpsc::channel::<StreamEvent>(QUEUE_CAPACITY);
    let drains = [
        spawn_drain(Stream::Stdout, child.stdout.take(), tx.clone()),
        spawn_drain(Stream::Stderr, child.stderr.take(), tx),
    ];

    let mut output = CallOutput::default();
    let mut open_streams = 2;
    let mut exited_early = false;

    while open_streams > 0 {
        match timeout(RECV_TIMEOUT, rx.recv()).await {
            Ok(Some(StreamEvent::Line(stream, line))) => {
                dispatch(&mut output, listener, stream, line);
            }
            Ok(Some(StreamEvent::Closed(stream))) => {
                debug!(%stream, "stream closed");
                open_streams -= 1;
            }
            Ok(None) => break,
            Err(_elapsed) => {
                if child.try_wait()?.is_some() && rx.is_empty() {
                    exited_early = true;
                    break;
                }
            }
        }
    }

    if exited_early {
        // Both drain tasks may still hold lines read just before the pipes
        // closed; collect them unless something keeps the pipes open.
        while open_streams > 0 {
            match timeout(EXIT_GRACE, rx.recv()).await {
                Ok(Some(StreamEvent::Line(stream, line))) => {
                    dispatch(&mut output, listener, stream, line);
                }
                Ok(Some(StreamEvent::Closed(_))) => open_streams -= 1,
                Ok(None) | Err(_) => break,
            }
        }
        if open_streams > 0 {
            warn!(command = %spec, "child exited but its output pipes stayed open");
        }
    }

    for drain in drains {
        drain.abort();
    }

    let status = child.wait().await?;
    output.exit_code = status.code().unwrap_or(-1);
    debug!(
        command = %spec,
        exit_code = output.exit_code,
        stdout_lines = output.stdout.len(),
        stderr_lines = output.stderr.len(),
        "streamed process finished"
    );

    Ok(output)
}

fn dispatch(output: &mut CallOutput, listener: &mut dyn LineListener, stream: Stream, line: String) {
    listener.on_line(stream, &line);
    match stream {
        Stream::Stdout => output.stdout.push(line),
        Stream::Stderr => output.stderr.push(line),
    }
}

fn spawn_drain<R>(stream: Stream, reader: Option<R>, tx: mpsc::Sender<StreamEvent>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Some(reader) = reader {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(StreamEvent::Line(stream, decode_line(&buf))).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        debug!(%stream, error = %e, "read error; treating stream as closed");
                        break;
                    }
                }
            }
        }
        let _ = tx.send(StreamEvent::Closed(stream)).await;
    })
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(buf: &[u8]) -> String {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
