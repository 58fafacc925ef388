//! Bakes `COACH_BUILD_SHA` into the binary for `coach --version`.
//!
//! The value is the short commit hash, suffixed with `-dirty` when tracked
//! files differ from HEAD, or `unknown` outside a git checkout.

use std::path::Path;
use std::process::Command;

fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    let repo = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let git_dir = repo.join(".git");
    println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
    println!("cargo:rerun-if-changed={}", git_dir.join("index").display());

    let build = match git(&repo, &["rev-parse", "--short=10", "HEAD"]).filter(|s| !s.is_empty()) {
        Some(sha) => {
            let dirty = git(&repo, &["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|s| !s.is_empty());
            if dirty { format!("{sha}-dirty") } else { sha }
        }
        None => "unknown".to_string(),
    };
    println!("cargo:rustc-env=COACH_BUILD_SHA={build}");
}
