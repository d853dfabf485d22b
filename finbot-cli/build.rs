use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=FINBOT_BUILD_SHA");

    // CI and container builds have no .git; let them pass the SHA in.
    if let Ok(sha) = std::env::var("FINBOT_BUILD_SHA") {
        if !sha.trim().is_empty() {
            println!("cargo:rustc-env=FINBOT_BUILD_SHA={}", sha.trim());
            return;
        }
    }

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = format!("{}/..", manifest_dir);

    let sha = Command::new("git")
        .args(["-C", &repo_root, "rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| {
            if o.status.success() {
                Some(String::from_utf8_lossy(&o.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=FINBOT_BUILD_SHA={}", sha);
}
