use crate::error::PeaksError;
use anyhow::{self, Context};
use std::fs::File;
use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// stderr goes to the log file if there is one
fn stderr_for(log: Option<&File>) -> std::io::Result<Stdio> {
    match log {
        Some(f) => Ok(Stdio::from(f.try_clone()?)),
        None => Ok(Stdio::inherit()),
    }
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

fn command_line(cmd: &Command) -> String {
    let mut line = program_name(cmd);
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

fn check_status(cmd: &Command, status: ExitStatus) -> anyhow::Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(PeaksError::CommandFailed {
        program: program_name(cmd),
        status,
    }
    .into())
}

///
/// Run a command to completion. A non-zero exit status is an error.
///
pub fn run_command(cmd: &mut Command, log: Option<&File>) -> anyhow::Result<()> {
    log::info!("running: {}", command_line(cmd));

    let status = cmd
        .stdin(Stdio::null())
        .stderr(stderr_for(log)?)
        .status()
        .with_context(|| format!("failed to execute {}", program_name(cmd)))?;

    check_status(cmd, status)
}

///
/// Feed `input` to the command's stdin and collect its stdout.
///
pub fn pipe_command(
    cmd: &mut Command,
    input: Vec<u8>,
    log: Option<&File>,
) -> anyhow::Result<Vec<u8>> {
    log::info!("running: {}", command_line(cmd));

    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(stderr_for(log)?)
        .spawn()
        .with_context(|| format!("failed to execute {}", program_name(cmd)))?;

    // stdin is written from another thread so a full stdout pipe
    // cannot block us
    let mut stdin = child.stdin.take().context("child stdin was not captured")?;
    let writer = thread::spawn(move || stdin.write_all(&input));

    let output = child.wait_with_output()?;

    match writer.join() {
        Ok(Ok(())) => {}
        // the child may exit without reading all of its input
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => return Err(e).context("failed to write to child stdin"),
        Err(_) => anyhow::bail!("stdin writer thread panicked"),
    }

    check_status(cmd, output.status)?;
    Ok(output.stdout)
}
