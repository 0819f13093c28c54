//! Build script for the site crate.
//!
//! Fingerprints the main stylesheet so it can be served under an immutable
//! cache policy. The short hash lands in `CSS_HASH` for `env!` access and a
//! `static/css/derived/main.{hash}.css` copy is written for `ServeDir`.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    match fingerprint_css(&css_path) {
        Ok(hash) => println!("cargo:rustc-env=CSS_HASH={hash}"),
        Err(e) => {
            // A fresh checkout may build before the stylesheet exists.
            println!("cargo:warning=could not fingerprint main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
        }
    }
}

/// Hash the stylesheet and write a `derived/main.{hash}.css` copy, returning
/// the first eight hex characters of the SHA-256 digest.
fn fingerprint_css(css_path: &Path) -> io::Result<String> {
    let content = fs::read(css_path)?;
    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash: String = digest.chars().take(8).collect();

    let derived_dir: PathBuf = css_path
        .parent()
        .map(|css_dir| css_dir.join("derived"))
        .ok_or_else(|| io::Error::other("main.css has no parent directory"))?;
    fs::create_dir_all(&derived_dir)?;
    fs::copy(css_path, derived_dir.join(format!("main.{short_hash}.css")))?;

    Ok(short_hash)
}
