use std::io;
use std::process::{Command, Output};
use tracing::{debug, instrument};

use crate::agent::AgentSession;

#[instrument]
pub fn check_git() -> Result<bool, io::Error> {
    let output = Command::new("git")
        .arg("--version")
        .output()?;

    debug!("{:#?}", output);

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_start().starts_with("git version"))
    } else {
        Ok(false)
    }
}

/// Run `git pull` in `path`, handing the agent socket to the child through
/// its environment. Returns the raw output whatever the exit status; the
/// caller decides what a nonzero exit means.
#[instrument]
pub fn pull(path: &str, agent: Option<&AgentSession>) -> Result<Output, io::Error> {
    let mut command = Command::new("git");
    command.arg("-C").arg(path).arg("pull");

    if let Some(agent) = agent {
        command.env("SSH_AUTH_SOCK", agent.auth_sock());
    }

    let output = command.output()?;

    debug!("{:#?}", output);

    Ok(output)
}

/// Stdout lines followed by stderr lines, newline-joined. Interleaving is
/// not preserved; git puts progress on stderr and summaries on stdout.
pub fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    lines.join("\n")
}
