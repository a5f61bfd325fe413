use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = match git_describe() {
        Some(tag) if !tag.is_empty() && !tag.ends_with("-dirty") => tag,
        Some(tag) if !tag.is_empty() => format!("{tag}.{}", build_stamp()),
        // No repository, e.g. a packaged source tree
        _ => {
            let base = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());
            format!("{base}+{}", build_stamp())
        }
    };

    println!("cargo:rustc-env=LAMBDAKIT_VERSION={version}");
}

/// `git describe` output with any leading `v` removed.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    Some(described.strip_prefix('v').unwrap_or(described).to_string())
}

fn build_stamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
