/*! External tools

The aligner, tokenizer and tagger are command line programs (uplug, hunalign, TreeTagger).
They are described by a [CommandTemplate] and run through [CommandTemplate::run],
which captures stdout, discards stderr and enforces an optional timeout.
!*/
use std::{
    io::{ErrorKind, Read},
    path::Path,
    process::{Command, Stdio},
    str::FromStr,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use log::debug;
use wait_timeout::ChildExt;

use crate::error::Error;

/// How long to wait for the output of a killed child to be drained.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// What a program wrote to stdout, and why it failed if it did.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    /// [Error::Process] for a non-zero exit status, [Error::Timeout] for a killed program.
    pub failure: Option<Error>,
}

impl ProcessOutput {
    /// Stdout of a successful run.
    pub fn into_result(self) -> Result<Vec<u8>, Error> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(self.stdout),
        }
    }
}

impl From<Vec<u8>> for ProcessOutput {
    fn from(stdout: Vec<u8>) -> Self {
        Self {
            stdout,
            failure: None,
        }
    }
}

fn take(captured: &Mutex<Vec<u8>>) -> Vec<u8> {
    std::mem::take(&mut *captured.lock().unwrap_or_else(PoisonError::into_inner))
}

/// A program along with its argument list.
///
/// Arguments may contain `{name}` placeholders that are substituted on [CommandTemplate::render].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Substitute placeholders. Unknown placeholders are left untouched.
    pub fn render(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (k, v)| {
                    acc.replace(&format!("{{{}}}", k), v)
                })
            })
            .collect()
    }

    /// Render then run the command, returning its stdout.
    ///
    /// A non-zero exit status, a spawn failure or a timeout are errors.
    pub fn run(
        &self,
        vars: &[(&str, &str)],
        workdir: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, Error> {
        self.capture(vars, workdir, timeout)?.into_result()
    }

    /// Render then run the command, keeping its stdout whatever the exit status.
    ///
    /// Only failing to start or wait for the program is an error. A non-zero exit status or a
    /// timeout are reported in [ProcessOutput::failure], along with what was written until then.
    /// On timeout the child is killed.
    pub fn capture(
        &self,
        vars: &[(&str, &str)],
        workdir: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, Error> {
        let args = self.render(vars);
        debug!("running {} {:?} (cwd: {:?})", self.program, args, workdir);

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = workdir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| self.failure(e.to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failure("stdout not captured".to_string()))?;

        // drained on its own thread so that a chatty child never blocks on a full pipe
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let reader = std::thread::spawn(move || -> std::io::Result<()> {
            let mut chunk = [0u8; 8192];
            loop {
                match stdout.read(&mut chunk) {
                    Ok(0) => return Ok(()),
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
        });

        let waited = match timeout {
            Some(t) => child.wait_timeout(t),
            None => child.wait().map(Some),
        };

        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                child.wait()?;

                // descendants may still hold the pipe open, so the reader is not joined
                let deadline = Instant::now() + DRAIN_GRACE;
                while !reader.is_finished() && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(10));
                }
                return Ok(ProcessOutput {
                    stdout: take(&captured),
                    failure: Some(Error::Timeout {
                        program: self.program.clone(),
                        secs: timeout.map(|t| t.as_secs()).unwrap_or_default(),
                    }),
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        reader
            .join()
            .map_err(|_| self.failure("stdout reader panicked".to_string()))??;

        let failure = if status.success() {
            None
        } else {
            Some(self.failure(format!("exited with {}", status)))
        };
        Ok(ProcessOutput {
            stdout: take(&captured),
            failure,
        })
    }

    fn failure(&self, reason: String) -> Error {
        Error::Process {
            program: self.program.clone(),
            reason,
        }
    }
}

impl FromStr for CommandTemplate {
    type Err = Error;

    /// Parses a whitespace separated command line. No quoting is supported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| Error::Custom("empty command template".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}
