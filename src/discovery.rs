//! @ai:module:intent Locate manifest files inside a Puppet module
//! @ai:module:layer infrastructure
//! @ai:module:public_api find_manifests, is_manifest, check_module_layout, normalize_root
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MANIFEST_EXTENSION: &str = "pp";

/// @ai:intent Check if a path names a manifest: `.pp` suffix and not a hidden file
/// @ai:example ("manifests/init.pp") -> true
/// @ai:example ("manifests/.init.pp") -> false
/// @ai:effects pure
pub fn is_manifest(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or(true, |name| name.starts_with('.'));

    !hidden
        && path
            .extension()
            .map(|ext| ext == MANIFEST_EXTENSION)
            .unwrap_or(false)
}

/// @ai:intent Find all manifests under a directory, sorted by path
/// @ai:effects fs:read
pub fn find_manifests(root: &Path) -> Vec<PathBuf> {
    let mut manifests: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_manifest(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    manifests.sort();
    manifests
}

/// @ai:intent Verify the directory looks like a module: it must hold `files/` and `manifests/`
/// @ai:effects fs:read
pub fn check_module_layout(root: &Path) -> Result<()> {
    if root.is_dir() && root.join("files").is_dir() && root.join("manifests").is_dir() {
        Ok(())
    } else {
        Err(Error::InvalidModule(root.to_path_buf()))
    }
}

/// @ai:intent Absolute, lexically normalized form of a module root
/// @ai:effects fs:read
pub fn normalize_root(root: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(root)?)
}
