use std::io;

use thiserror::Error;
use tracing::{info, warn};

use crate::agent::AgentSession;
use crate::cfg::Cfg;
use crate::git;

#[derive(Debug, Error)]
pub enum DeployError {
    /// The request body was not a usable webhook payload.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// No deploy directory is mapped for the repository name. The Display
    /// text is the response body, so the wording is load-bearing.
    #[error("Unhandled repo: {0}")]
    UnknownRepo(String),

    /// `git pull` could not be spawned at all.
    #[error("could not run git pull: {0}")]
    Pull(#[from] io::Error),
}

/// Resolve `name` to its deploy directory and pull it, with a scoped
/// ssh-agent alive for the duration of the pull.
///
/// A nonzero pull exit is not an error here: the combined output is
/// returned either way and the exit code only reaches the service log.
pub fn run(cfg: &Cfg, name: &str) -> Result<String, DeployError> {
    let repo = cfg
        .repos
        .get(name)
        .ok_or_else(|| DeployError::UnknownRepo(name.to_string()))?;

    let agent = match AgentSession::start() {
        Ok(session) => Some(session),
        Err(err) => {
            warn!("could not start ssh-agent, pulling without one: {err}");
            None
        }
    };

    let output = git::pull(&repo.path, agent.as_ref())?;

    if output.status.success() {
        info!(repo = name, path = %repo.path, "pull finished");
    } else {
        warn!(
            repo = name,
            path = %repo.path,
            code = ?output.status.code(),
            "git pull exited nonzero"
        );
    }

    // the agent, if one started, dies with this scope
    Ok(git::combined_output(&output))
}
