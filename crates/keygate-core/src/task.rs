//! Continuations unlocked by a successful authentication

use std::ffi::OsString;
use std::process::Command;

use tracing::{error, info};

use crate::error::{Error, Result};

/// The protected action.
///
/// `run` consumes the task, so it can be invoked at most once.
pub trait Continuation {
    fn run(self);
}

impl<F: FnOnce()> Continuation for F {
    fn run(self) {
        self()
    }
}

/// Runs an external program as the protected action
#[derive(Debug)]
pub struct CommandTask {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandTask {
    pub fn new<I, A>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Run the program to completion, failing if it cannot start or exits non-zero
    pub fn execute(&self) -> Result<()> {
        info!("Running {:?}", self.program);

        let status = Command::new(&self.program).args(&self.args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Task(format!("{:?} exited with {}", self.program, status)))
        }
    }
}

impl Continuation for CommandTask {
    fn run(self) {
        if let Err(e) = self.execute() {
            error!("Protected command failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_closure_is_continuation() {
        let ran = Cell::new(0);
        (|| ran.set(ran.get() + 1)).run();
        assert_eq!(ran.get(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_task_success() {
        let task = CommandTask::new("true", Vec::<String>::new());
        assert!(task.execute().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_task_failure() {
        let task = CommandTask::new("sh", ["-c", "exit 3"]);
        assert!(matches!(task.execute(), Err(Error::Task(_))));
    }

    #[test]
    fn test_command_task_missing_program() {
        let task = CommandTask::new("keygate-no-such-program", Vec::<String>::new());
        assert!(matches!(task.execute(), Err(Error::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_task_as_continuation() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");

        CommandTask::new("touch", [marker.as_os_str()]).run();
        assert!(marker.exists());

        // Failure is logged, not raised
        CommandTask::new("sh", ["-c", "exit 1"]).run();
    }
}
