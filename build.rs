use std::env;
use std::process::Command;

/// Container builds usually ship without `.git`, so the host may pass the tag in directly.
const TAG_OVERRIDE: &str = "BUILD_TAG";

fn git_tag() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|tag| tag.trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed={TAG_OVERRIDE}");

    let tag = env::var(TAG_OVERRIDE).ok().or_else(git_tag);
    if let Some(tag) = tag.filter(|tag| !tag.trim().is_empty()) {
        println!("cargo:rustc-env=GIT_TAG={}", tag.trim());
    }
}
