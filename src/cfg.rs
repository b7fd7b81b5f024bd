use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::process::exit;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Repo {
    pub path: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Cfg {
    /// Repository name -> deploy directory.
    pub repos: HashMap<String, Repo>,

    #[serde(default = "default_log_path")]
    pub log_path: String,

    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Shared webhook secret. When set, deliveries must carry a valid
    /// X-Hub-Signature-256 header.
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_log_path() -> String {
    "deploy-log.txt".to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3030))
}

pub fn read_config(path: &str) -> Cfg {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("could not read {path}: {err}");
            exit(1);
        }
    };

    match toml::from_str(&contents) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("could not decode {path}: {err}");
            exit(1);
        }
    }
}
