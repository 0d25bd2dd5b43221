use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "random-sfx";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/random-sfx/ (XDG standard)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR_NAME)
    }
    #[cfg(windows)]
    {
        // Portable installs keep a data/ directory beside the executable
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_data = exe_dir.join("data");
                if portable_data.exists() {
                    return portable_data;
                }
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }
}

pub fn log_path() -> PathBuf {
    data_dir().join("random-sfx.log")
}

#[cfg(unix)]
fn mpv_binary_names() -> &'static [&'static str] {
    &["mpv"]
}

#[cfg(windows)]
fn mpv_binary_names() -> &'static [&'static str] {
    &["mpv.exe", "mpv.com", "mpv"]
}

fn find_beside_exe(names: &[&str]) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    for name in names {
        let p = dir.join(name);
        if p.exists() {
            return Some(p);
        }
        let p = dir.join("external").join(name);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn find_on_path(names: &[&str]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in names {
            let p = dir.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

/// Find the mpv binary used for playback.
///
/// Searches in order:
/// 1. MPV_PATH environment variable
/// 2. Beside the current executable (or its `external/` subdirectory)
/// 3. PATH
pub fn find_mpv_binary() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os("MPV_PATH").map(PathBuf::from) {
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(p) = find_beside_exe(mpv_binary_names()) {
        return Some(p);
    }

    find_on_path(mpv_binary_names())
}
