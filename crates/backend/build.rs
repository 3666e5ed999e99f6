use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Кладёт `config.toml` из корня workspace рядом с собранным бинарником,
/// где его ищет `shared::config::load_config`.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(workspace_root) = manifest_dir.parent().and_then(Path::parent) else {
        println!("cargo:warning=workspace root not found, config.toml not copied");
        return;
    };
    let source = workspace_root.join("config.toml");
    if !source.exists() {
        println!("cargo:warning=no config.toml in workspace root, embedded defaults will be used");
        return;
    }

    let (Ok(out_dir), Ok(profile)) = (env::var("OUT_DIR"), env::var("PROFILE")) else {
        return;
    };
    // OUT_DIR = target/<profile>/build/<pkg>-<hash>/out
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
    else {
        println!("cargo:warning=target/{} not found above OUT_DIR", profile);
        return;
    };

    let dest = target_dir.join("config.toml");
    if let Err(e) = fs::copy(&source, &dest) {
        panic!("failed to copy {} to {}: {}", source.display(), dest.display(), e);
    }
}
