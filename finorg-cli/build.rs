use std::path::Path;
use std::process::Command;

/// Run git in the workspace root and return trimmed stdout on success.
fn git(root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let root = Path::new(&manifest_dir).join("..");

    // `finorg --version` shows e.g. "0.1.0 (3f2c1ab+dirty)"
    let version = match git(&root, &["rev-parse", "--short", "HEAD"]) {
        Some(sha) if git(&root, &["status", "--porcelain", "--untracked-files=no"]).is_some() => {
            format!("{sha}+dirty")
        }
        Some(sha) => sha,
        None => "unknown".to_string(),
    };

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rustc-env=FINORG_BUILD_SHA={version}");
}
