//! External command boundary

use std::future::Future;
use std::io;

use tokio::process::Command;

/// Runs the command string mapped to a key
pub trait CommandRunner {
    /// Run `command` and wait for it to finish
    fn run(&self, command: &str) -> impl Future<Output = io::Result<()>>;
}

/// Runs commands through `/bin/sh -c`, like `system(3)`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> io::Result<()> {
        let status = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("command exited with {}", status),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_success() {
        assert!(ShellRunner.run("true").await.is_ok());
    }

    #[tokio::test]
    async fn test_shell_failure_status() {
        let err = ShellRunner.run("exit 3").await.unwrap_err();
        assert!(err.to_string().contains("exited"));
    }

    #[tokio::test]
    async fn test_shell_runs_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");

        ShellRunner
            .run(&format!("touch {}", marker.display()))
            .await
            .unwrap();
        assert!(marker.exists());
    }
}
