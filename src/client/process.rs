// ABOUTME: Child process execution shared by the helm and kubectl clients.
// ABOUTME: Captures exit code and output; optional stdin carries secrets off the argv.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn exited_with(&self, allowed: &[i32]) -> bool {
        self.code.is_some_and(|code| allowed.contains(&code))
    }
}

pub(crate) async fn run_command(
    program: &Path,
    args: &[String],
    envs: &HashMap<String, String>,
    stdin: Option<&str>,
) -> std::io::Result<CommandOutput> {
    tracing::debug!("running {} {}", program.display(), args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .envs(envs)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(input) = stdin
        && let Some(mut pipe) = child.stdin.take()
    {
        pipe.write_all(input.as_bytes()).await?;
        pipe.shutdown().await?;
    }

    let output = child.wait_with_output().await?;
    let result = CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !result.stdout.is_empty() {
        tracing::trace!("{} stdout: {}", program.display(), result.stdout.trim_end());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_exit_code_and_output() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = run_command(Path::new("sh"), &args, &HashMap::new(), None)
            .await
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(output.exited_with(&[0, 3]));
        assert!(!output.exited_with(&[0]));
    }

    #[tokio::test]
    async fn feeds_stdin() {
        let args = vec!["-c".to_string(), "cat".to_string()];
        let output = run_command(Path::new("sh"), &args, &HashMap::new(), Some("s3cret"))
            .await
            .unwrap();
        assert_eq!(output.stdout, "s3cret");
    }

    #[tokio::test]
    async fn passes_environment() {
        let args = vec!["-c".to_string(), "printf %s \"$TUGBOAT_TEST\"".to_string()];
        let envs = HashMap::from([("TUGBOAT_TEST".to_string(), "yes".to_string())]);
        let output = run_command(Path::new("sh"), &args, &envs, None).await.unwrap();
        assert_eq!(output.stdout, "yes");
    }
}
