//! Build script for obesity-predictor
//!
//! Embeds `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` for the startup
//! log and `/api/buildinfo`. Reruns when the crate sources or the checked-out
//! commit change.

use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", git_hash());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!(
        "cargo:rustc-env=BUILD_PROFILE={}",
        std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string())
    );

    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=build.rs");
    let head = Path::new("../.git/HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
}

/// Short commit hash, or "unknown" outside a git checkout
fn git_hash() -> String {
    let output = match Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() {
        Ok(output) if output.status.success() => output,
        _ => return "unknown".to_string(),
    };

    match String::from_utf8(output.stdout) {
        Ok(hash) if !hash.trim().is_empty() => hash.trim().to_string(),
        _ => "unknown".to_string(),
    }
}

/// RFC 3339 local time, second precision
fn build_timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
