//! Build metadata read by `diagnostics::about_info` and the startup log line.
//!
//! `BUILD_TIMESTAMP` honours `SOURCE_DATE_EPOCH` so packaged builds are
//! reproducible. `BUILD_GIT_SHA` can be pinned with `LILY_BUILD_SHA` when
//! building from a source tarball without `.git`.

use std::env;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!("cargo:rustc-env=BUILD_GIT_SHA={}", git_sha());

    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=LILY_BUILD_SHA");
    if Path::new(".git/HEAD").exists() {
        println!("cargo:rerun-if-changed=.git/HEAD");
    }
}

fn build_timestamp() -> String {
    let at = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn git_sha() -> String {
    if let Some(pinned) = env::var("LILY_BUILD_SHA")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        return pinned;
    }
    Command::new("git")
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.into())
}
