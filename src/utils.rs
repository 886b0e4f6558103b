use std::env;
use std::path::{Path, PathBuf};

/// Look for an executable called `name`, first in each of `search_dirs`,
/// then on `PATH`. The result is absolute and canonical.
pub fn find_executable_in_dirs<P: AsRef<Path>>(name: &str, search_dirs: &[P]) -> Option<PathBuf> {
    // An explicit path skips the search
    let as_path = Path::new(name);
    if as_path.components().count() > 1 {
        return is_executable(as_path).then(|| canonicalize(as_path));
    }

    let path_dirs: Vec<PathBuf> = env::var_os("PATH")
        .map(|p| env::split_paths(&p).collect())
        .unwrap_or_default();

    search_dirs
        .iter()
        .map(|d| d.as_ref().to_path_buf())
        .chain(path_dirs)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
        .map(|found| canonicalize(&found))
}

fn canonicalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };
    // dunce avoids \\?\ prefixes on Windows
    dunce::canonicalize(&absolute).unwrap_or(absolute)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
