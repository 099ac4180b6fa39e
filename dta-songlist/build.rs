//! Stamps the dta-songlist binary with the commit, build time and profile
//! it was built from. `main` prints them in its startup banner.
//!
//! No `rerun-if-changed` lines are emitted, so Cargo reruns this script on
//! every build and the stamp never goes stale.

use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Output of a git command run in the crate directory, if it succeeded
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}

/// Short commit hash, suffixed with `-dirty` when the tree has local edits
fn commit_id() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return UNKNOWN.to_string();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{hash}-dirty"),
        _ => hash,
    }
}

/// UTC build time; `SOURCE_DATE_EPOCH` pins it for reproducible builds
fn build_time() -> String {
    let pinned = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));
    pinned
        .unwrap_or_else(chrono::Utc::now)
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    println!("cargo:rustc-env=GIT_HASH={}", commit_id());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_time());
    println!("cargo:rustc-env=BUILD_PROFILE={profile}");
}
