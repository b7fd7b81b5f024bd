use std::convert::Infallible;
use std::process::exit;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{reply, Filter};

mod agent;
mod appstate;
mod cfg;
mod deploy;
mod deploylog;
mod git;
mod payload;

use crate::appstate::AppState;
use crate::deploy::DeployError;
use crate::payload::Payload;

type HmacSha256 = Hmac<Sha256>;

/// Check a GitHub-style `X-Hub-Signature-256` header against the raw body.
/// `verify_slice` compares in constant time.
fn verify_signature(secret: &[u8], body: &[u8], signature: &str) -> bool {
    let Some(hex_sig) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

async fn hook(
    state: Arc<AppState>,
    signature: Option<String>,
    body: Bytes,
) -> Result<impl warp::Reply, Infallible> {
    if let Some(secret) = &state.cfg.secret {
        let allowed = signature
            .as_deref()
            .is_some_and(|sig| verify_signature(secret.as_bytes(), &body, sig));
        if !allowed {
            info!("dropping delivery with bad or missing signature");
            return Ok(reply::with_status(
                "not allowed".to_string(),
                StatusCode::FORBIDDEN,
            ));
        }
    }

    let payload: Payload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(err) => {
            return Ok(reply::with_status(
                DeployError::MalformedPayload(err.to_string()).to_string(),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    let name = payload.repository.name;
    if name.is_empty() {
        return Ok(reply::with_status(
            DeployError::MalformedPayload("repository.name is empty".to_string()).to_string(),
            StatusCode::BAD_REQUEST,
        ));
    }

    // Best-effort audit line; a full disk must not block the deploy.
    if let Err(err) = deploylog::append(&state.cfg.log_path, &name) {
        warn!("could not append to {}: {err}", state.cfg.log_path);
    }

    match deploy::run(&state.cfg, &name) {
        Ok(output) => Ok(reply::with_status(output, StatusCode::OK)),
        Err(err @ DeployError::UnknownRepo(_)) => {
            Ok(reply::with_status(err.to_string(), StatusCode::NOT_FOUND))
        }
        Err(err) => Ok(reply::with_status(
            err.to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        )),
    }
}

async fn health() -> Result<&'static str, warp::Rejection> {
    Ok("ok")
}

fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health);

    let hook = warp::path("hook")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::optional::<String>("x-hub-signature-256"))
        .and(warp::body::bytes())
        .and_then(move |signature: Option<String>, body: Bytes| {
            hook(state.clone(), signature, body)
        });

    health.or(hook)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deployhook=info")),
        )
        .init();

    let cfg = cfg::read_config("deployhook.toml");

    match git::check_git() {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            eprintln!("no usable git on PATH");
            exit(1);
        }
    }

    let addr = cfg.listen;
    let state = Arc::new(AppState { cfg });

    info!(%addr, repos = state.cfg.repos.len(), "listening");

    warp::serve(routes(state)).run(addr).await;
}
