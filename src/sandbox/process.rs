use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::ExecError;

/// Exit status plus stdout and stderr interleaved in write order
#[derive(Debug)]
pub struct Capture {
    pub status: ExitStatus,
    pub output: String,
}

/// Exit status with stdout and stderr kept apart
#[derive(Debug)]
pub struct SplitCapture {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `command` to completion, feeding `stdin` and capturing both streams into one
///
/// Both streams share a single sink so they appear in the order the child wrote
/// them, the way most interpreters expect their diagnostics to be read.
pub fn capture_combined(
    command: &mut Command,
    stdin: &str,
    timeout: Option<Duration>,
) -> Result<Capture, ExecError> {
    let mut sink = tempfile::tempfile()?;
    command
        .stdout(Stdio::from(sink.try_clone()?))
        .stderr(Stdio::from(sink.try_clone()?));

    let status = wait_with_stdin(command, stdin, timeout)?;

    Ok(Capture {
        status,
        output: read_back(&mut sink)?,
    })
}

/// Runs `command` to completion, feeding `stdin` and capturing each stream separately
pub fn capture_split(
    command: &mut Command,
    stdin: &str,
    timeout: Option<Duration>,
) -> Result<SplitCapture, ExecError> {
    let mut stdout = tempfile::tempfile()?;
    let mut stderr = tempfile::tempfile()?;
    command
        .stdout(Stdio::from(stdout.try_clone()?))
        .stderr(Stdio::from(stderr.try_clone()?));

    let status = wait_with_stdin(command, stdin, timeout)?;

    Ok(SplitCapture {
        status,
        stdout: read_back(&mut stdout)?,
        stderr: read_back(&mut stderr)?,
    })
}

/// Describes an exit status the way users expect to read it
pub fn describe_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit status {code}");
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal: {signal}");
        }
    }

    status.to_string()
}

fn wait_with_stdin(
    command: &mut Command,
    stdin: &str,
    timeout: Option<Duration>,
) -> Result<ExitStatus, ExecError> {
    let program = command.get_program().to_string_lossy().into_owned();
    command.stdin(Stdio::piped());

    // The child leads its own process group so a timeout reaches its descendants
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command
        .spawn()
        .map_err(|source| ExecError::Spawn { program, source })?;

    // Write stdin from a separate thread so a child that never reads it
    // cannot stall us past the timeout
    let writer = child.stdin.take().map(|mut pipe| {
        let input = stdin.as_bytes().to_vec();
        thread::spawn(move || pipe.write_all(&input))
    });

    let status = match wait(&mut child, timeout) {
        Ok(status) => status,
        Err(e) => {
            kill_process_group(&mut child);
            let _ = child.wait();
            return Err(e);
        }
    };

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The child exited without consuming all of its input
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(io::Error::other("stdin writer panicked").into()),
        }
    }

    Ok(status)
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, ExecError> {
    let Some(limit) = timeout else {
        return Ok(child.wait()?);
    };

    match child.wait_timeout(limit)? {
        Some(status) => Ok(status),
        None => {
            log::warn!("Process {} exceeded {} ms, killing it", child.id(), limit.as_millis());
            Err(ExecError::TimedOut {
                millis: limit.as_millis(),
            })
        }
    }
}

/// Kills `child` and everything still running in its process group
fn kill_process_group(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(group) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg only sends a signal to the group created at spawn
        if unsafe { libc::killpg(group, libc::SIGKILL) } == 0 {
            return;
        }
        log::warn!(
            "Failed to kill process group {group}: {}",
            io::Error::last_os_error()
        );
    }

    let _ = child.kill();
}

fn read_back(file: &mut File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
