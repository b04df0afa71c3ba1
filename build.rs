use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=SCHEMADOC_DOCS_DIR_HINT");

    let hint = env::var("SCHEMADOC_DOCS_DIR_HINT").ok();

    if let Some(raw_hint) = hint {
        let candidate = PathBuf::from(raw_hint);
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!(
            "cargo:rustc-env=SCHEMADOC_DOCS_DIR_HINT={}",
            canonical.display()
        );
    }
}
