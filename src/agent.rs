use std::io;
use std::process::Command;
use tracing::{debug, instrument, warn};

/// Handle to a transient ssh-agent that holds deploy credentials for the
/// duration of one pull. The agent is killed when the handle is dropped,
/// so teardown runs on every exit path.
#[derive(Debug)]
pub struct AgentSession {
    pid: u32,
    auth_sock: String,
}

impl AgentSession {
    #[instrument]
    pub fn start() -> Result<AgentSession, io::Error> {
        let output = Command::new("ssh-agent").arg("-s").output()?;

        debug!("{:#?}", output);

        if !output.status.success() {
            return Err(io::Error::other("ssh-agent -s exited nonzero"));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (auth_sock, pid) = parse_env_output(&stdout)
            .ok_or_else(|| io::Error::other("ssh-agent -s printed no socket/pid"))?;

        Ok(AgentSession { pid, auth_sock })
    }

    pub fn auth_sock(&self) -> &str {
        &self.auth_sock
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        // The pid goes into the child's environment, never our own.
        let result = Command::new("ssh-agent")
            .arg("-k")
            .env("SSH_AGENT_PID", self.pid.to_string())
            .output();

        match result {
            Ok(output) if output.status.success() => {
                debug!(pid = self.pid, "ssh-agent stopped");
            }
            Ok(output) => {
                warn!(pid = self.pid, code = ?output.status.code(), "ssh-agent -k exited nonzero");
            }
            Err(err) => {
                warn!(pid = self.pid, "could not run ssh-agent -k: {err}");
            }
        }
    }
}

/// Parse the sh-style assignments `ssh-agent -s` prints:
///
/// ```text
/// SSH_AUTH_SOCK=/tmp/ssh-XXXXXX/agent.123; export SSH_AUTH_SOCK;
/// SSH_AGENT_PID=124; export SSH_AGENT_PID;
/// echo Agent pid 124;
/// ```
fn parse_env_output(stdout: &str) -> Option<(String, u32)> {
    let mut auth_sock = None;
    let mut pid = None;

    for line in stdout.lines() {
        let Some((assignment, _)) = line.split_once(';') else {
            continue;
        };
        let Some((key, value)) = assignment.split_once('=') else {
            continue;
        };
        match key.trim() {
            "SSH_AUTH_SOCK" => auth_sock = Some(value.to_string()),
            "SSH_AGENT_PID" => pid = value.parse().ok(),
            _ => {}
        }
    }

    Some((auth_sock?, pid?))
}
