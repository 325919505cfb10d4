use std::env;
use std::process::Command;

const SHA_VAR: &str = "TASKPULSE_BUILD_SHA";

// Packagers building from a tarball have no .git; they can set the SHA directly.
fn main() {
    println!("cargo:rerun-if-env-changed={SHA_VAR}");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let sha = env::var(SHA_VAR)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(git_short_sha)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={SHA_VAR}={sha}");
}

fn git_short_sha() -> Option<String> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").ok()?;
    let out = Command::new("git")
        .current_dir(manifest_dir)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
