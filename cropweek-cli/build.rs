use std::path::Path;
use std::process::Command;

// Release tarballs have no .git, so packagers can pin the label instead.
const OVERRIDE: &str = "CROPWEEK_BUILD_SHA";

fn git(root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn build_label(root: &Path) -> String {
    if let Ok(pinned) = std::env::var(OVERRIDE) {
        if !pinned.trim().is_empty() {
            return pinned.trim().to_string();
        }
    }

    let Some(sha) = git(root, &["rev-parse", "--short", "HEAD"]) else {
        return "unknown".to_string();
    };
    let dirty = git(root, &["status", "--porcelain", "--untracked-files=no"]).is_some();
    if dirty { format!("{sha}-dirty") } else { sha }
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let root = Path::new(&manifest_dir).join("..");

    println!("cargo:rerun-if-env-changed={OVERRIDE}");
    for watched in [".git/HEAD", ".git/index"] {
        let path = root.join(watched);
        if path.exists() {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }

    println!("cargo:rustc-env={OVERRIDE}={}", build_label(&root));
}
