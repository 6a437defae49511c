use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::bridge::{BridgeClient, CommandOutput};
use crate::error::BridgeError;

const WAIT_STEP: Duration = Duration::from_millis(20);

/// Runs `<adb> -s <device> <argv…>` as a fresh child process per call.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
    timeout: Duration,
}

impl AdbBridge {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn describe(&self, device_id: &str, argv: &[String]) -> String {
        format!("{} -s {} {}", self.program, device_id, argv.join(" "))
    }
}

impl BridgeClient for AdbBridge {
    fn execute(&self, device_id: &str, argv: &[String]) -> Result<CommandOutput, BridgeError> {
        let command = self.describe(device_id, argv);
        debug!(%command, "bridge call");

        let mut child = Command::new(&self.program)
            .arg("-s")
            .arg(device_id)
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BridgeError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        // Drain both pipes concurrently so a large dump cannot fill the
        // pipe buffer and stall the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let exit_code = match wait_with_deadline(&mut child, self.timeout) {
            Ok(Some(code)) => code,
            Ok(None) => {
                if let Err(e) = child.kill() {
                    warn!(%command, error = %e, "failed to kill timed-out bridge call");
                }
                let _ = child.wait();
                return Err(BridgeError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
            Err(e) => return Err(BridgeError::Io { command, source: e }),
        };

        let output = CommandOutput {
            exit_code,
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
        };

        if !output.success() {
            debug!(%command, code = ?output.exit_code, stderr = %output.stderr.trim(), "bridge call failed");
        }
        Ok(output)
    }
}

/// `Ok(Some(code))` when the child exited in time, `Ok(None)` on timeout.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<Option<i32>>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status.code()));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(WAIT_STEP);
    }
}

fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_drain(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
