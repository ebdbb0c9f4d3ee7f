use std::{
    env,
    path::{Path, PathBuf},
};

#[cfg(windows)]
pub fn to_wstring(s: &str) -> Vec<u16> {
    use std::{ffi::OsStr, os::windows::ffi::OsStrExt};

    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Directory holding the executable. A `bin/` folder is skipped so a
/// packaged layout (`app/bin/rickroll.exe` + `app/assets/`) resolves the same
/// way as a flat one.
pub fn app_root_dir() -> Option<PathBuf> {
    let exe_path = env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    if exe_dir.file_name().and_then(|n| n.to_str()) == Some("bin") {
        return exe_dir.parent().map(Path::to_path_buf);
    }

    Some(exe_dir.to_path_buf())
}

pub fn app_config_path() -> PathBuf {
    app_root_dir()
        .map(|root| root.join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

/// Resolves `dir` against the executable's directory unless it is already
/// absolute.
pub fn resolve_asset_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }

    app_root_dir()
        .map(|root| root.join(dir))
        .unwrap_or_else(|| dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_asset_dirs_are_kept() {
        let dir = env::temp_dir().join("rickroll-assets");
        assert_eq!(resolve_asset_dir(&dir), dir);
    }

    #[test]
    fn relative_asset_dirs_hang_off_the_app_root() {
        let resolved = resolve_asset_dir(Path::new("assets"));
        assert!(resolved.ends_with("assets"));
        if let Some(root) = app_root_dir() {
            assert!(resolved.starts_with(root));
        }
    }

    #[test]
    fn config_file_is_named_config_yaml() {
        assert_eq!(
            app_config_path().file_name().and_then(|n| n.to_str()),
            Some("config.yaml")
        );
    }
}
