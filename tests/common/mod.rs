// SPDX-License-Identifier: GPL-3.0-only

//! Scripted stand-in for the external camera utility

use photobox::camera::{CommandOutput, CommandRunner};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Replays configured outcomes instead of shelling out.
///
/// Capture invocations optionally materialize the `--filename` target after
/// a delay, the way a real camera transfers the image some time after the
/// command returns.
pub struct ScriptedRunner {
    pub calls: Mutex<Vec<Vec<String>>>,
    capture_exit: i32,
    write_file: bool,
    write_delay: Duration,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            capture_exit: 0,
            write_file: true,
            write_delay: Duration::from_millis(10),
        }
    }

    /// Make capture invocations exit nonzero
    pub fn failing_capture(mut self, exit: i32) -> Self {
        self.capture_exit = exit;
        self
    }

    /// Capture succeeds but the file never shows up
    pub fn without_file(mut self) -> Self {
        self.write_file = false;
        self
    }

    pub fn capture_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|args| args.iter().any(|a| a == "--capture-image-and-download"))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, _program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let is_capture = args.iter().any(|a| a == "--capture-image-and-download");
        self.calls.lock().unwrap().push(args.clone());

        if is_capture {
            if self.capture_exit != 0 {
                return Ok(CommandOutput {
                    code: Some(self.capture_exit),
                    stdout: String::new(),
                });
            }
            if self.write_file
                && let Some(pos) = args.iter().position(|a| a == "--filename")
            {
                let path = PathBuf::from(&args[pos + 1]);
                let delay = self.write_delay;
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    // a real decodable image; collage rendering reopens it
                    let shot = image::RgbImage::from_pixel(64, 48, image::Rgb([200, 60, 60]));
                    let _ = shot.save(&path);
                });
            }
        }

        Ok(CommandOutput {
            code: Some(0),
            stdout: String::new(),
        })
    }

    fn pulse(&self, _program: &str, args: &[&str], _hold: Duration) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|s| s.to_string()).collect());
        Ok(())
    }
}
