//! Types for the exec module.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

/// A single call to an external program with its ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Program name or path, resolved through `PATH` when not absolute.
    pub program: String,
    /// Arguments, passed verbatim and in order.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the child (inherits the caller's when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory of the child.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Renders the invocation as a single shell-quoted line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Quotes a word for POSIX shells, leaving plain words untouched.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=,+@%".contains(c));

    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

/// Exit status of a finished child, normalised to a shell-style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: i32,
}

impl ExitOutcome {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Converts a process status; a child killed by a signal reports `128 + signal`.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self { code: 128 + signal };
            }
        }

        Self { code: 1 }
    }
}

/// Captured output of a bounded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit: ExitOutcome,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit.success()
    }

    /// Stdout followed by stderr, separated by a newline.
    ///
    /// CMSSW's MessageLogger writes summaries to stderr, so parsers look at both.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// The last `max_chars` characters of stderr.
    pub fn stderr_tail(&self, max_chars: usize) -> String {
        let count = self.stderr.chars().count();
        self.stderr
            .chars()
            .skip(count.saturating_sub(max_chars))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_plain_words() {
        let inv = Invocation::new("cmsRun").arg("NanoAOD_Run2_cfg.py");
        assert_eq!(inv.command_line(), "cmsRun NanoAOD_Run2_cfg.py");
    }

    #[test]
    fn test_command_line_quotes_spaces_and_quotes() {
        let inv = Invocation::new("dasgoclient")
            .args(["--query", "file dataset=/A/B/MINIAODSIM"])
            .arg("it's");
        assert_eq!(
            inv.to_string(),
            r"dasgoclient --query 'file dataset=/A/B/MINIAODSIM' 'it'\''s'"
        );
    }

    #[test]
    fn test_shell_quote_empty() {
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_stderr_tail() {
        let output = CommandOutput {
            exit: ExitOutcome::new(1),
            stdout: String::new(),
            stderr: "abcdef".to_string(),
        };
        assert_eq!(output.stderr_tail(3), "def");
        assert_eq!(output.stderr_tail(100), "abcdef");
        assert!(!output.success());
    }

    #[test]
    fn test_combined_output_keeps_both_streams() {
        let output = CommandOutput {
            exit: ExitOutcome::new(0),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");
    }
}
