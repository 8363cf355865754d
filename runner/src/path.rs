//! Path helper functions

use std::path::PathBuf;

use crate::build::FIRMWARE_TARGET;

/// Return the root of the workspace.
pub fn get_workspace_path() -> PathBuf {
    // The runner lives one level below the workspace root.
    let runner_manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match runner_manifest.parent() {
        Some(root) => root.to_owned(),
        None => runner_manifest,
    }
}

/// Return the directory holding the firmware build outputs.
pub fn get_target_dir_path(release: bool) -> PathBuf {
    let mut path = get_workspace_path();
    path.push("target");
    path.push(FIRMWARE_TARGET);
    path.push(if release { "release" } else { "debug" });
    path
}

/// Return the path to the linker script, relative to the workspace root.
pub fn get_linker_script_path() -> PathBuf {
    let mut path = get_workspace_path();
    path.push("misc");
    path.push("linker-script.x");
    path
}
