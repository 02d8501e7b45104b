// SPDX-License-Identifier: GPL-3.0-only

//! Subprocess seam for the external camera utility
//!
//! Every interaction with the camera hardware goes through a command-line
//! tool with an exit code and line-oriented stdout. The trait keeps that
//! boundary opaque so the sequencer and detector can be driven by a scripted
//! runner in tests.

use std::io;
use std::time::Duration;

/// Outcome of one command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code; None when killed by a signal
    pub code: Option<i32>,
    /// Captured stdout, lossily decoded
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external hardware commands
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// Spawn a command, hold it open briefly, then kill it.
    ///
    /// Some camera bodies need a short live-view pulse to leave playback
    /// mode; the command itself never terminates on its own.
    fn pulse(&self, program: &str, args: &[&str], hold: Duration) -> io::Result<()>;
}

/// Production runner shelling out via `std::process`
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = std::process::Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    fn pulse(&self, program: &str, args: &[&str], hold: Duration) -> io::Result<()> {
        let mut child = std::process::Command::new(program)
            .args(args)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()?;
        std::thread::sleep(hold);
        let _ = child.kill();
        let _ = child.wait();
        Ok(())
    }
}
