use anyhow::{Context, Result};
use coach_core::{Goal, OptimizeRequest};
use std::fs;
use std::path::Path;

/// Read an `OptimizeRequest` from a JSON file.
pub fn load_request(path: &Path) -> Result<OptimizeRequest> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_request(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_request(s: &str) -> Result<OptimizeRequest> {
    serde_json::from_str(s).context("request is not valid JSON for an optimize request")
}

/// Command-line overrides layered on top of the request file.
pub fn apply_overrides(mut request: OptimizeRequest, goal: Option<Goal>) -> OptimizeRequest {
    if let Some(goal) = goal {
        tracing::debug!(from = %request.goal, to = %goal, "goal overridden on the command line");
        request.goal = goal;
    }
    request
}

#[cfg(test)]
pub(crate) fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join("sample_request.json")
}
