use crate::cfg;

/// Read-only state shared with the request handlers. Wrapped in an `Arc`
/// by the caller; nothing in here is mutated after startup.
pub struct AppState {
    pub cfg: cfg::Cfg,
}
