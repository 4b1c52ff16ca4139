/// Image asset probing.
///
/// The core never decodes image bytes; it only needs "loaded" or "failed".
/// Local references are checked on disk. Remote (`http://`, `https://`) and
/// inline (`data:`) references are handed to the presentation layer as-is
/// and count as loaded.
///
/// A relative local reference is looked up under each search directory in
/// order (roster directory first, then the usual data dirs), and finally
/// against the working directory.

use std::path::{Path, PathBuf};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssetStatus {
    Loaded,
    /// Degraded: the reveal runs over a broken-image placeholder.
    Failed,
}

pub fn is_remote(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

pub fn probe(reference: &str, search_dirs: &[PathBuf]) -> AssetStatus {
    if reference.trim().is_empty() {
        return AssetStatus::Failed;
    }
    if is_remote(reference) {
        return AssetStatus::Loaded;
    }
    match locate(reference, search_dirs) {
        Some(_) => AssetStatus::Loaded,
        None => AssetStatus::Failed,
    }
}

/// First non-empty file the reference names.
pub fn locate(reference: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let path = Path::new(reference);
    if path.is_absolute() {
        return is_usable(path).then(|| path.to_path_buf());
    }
    search_dirs
        .iter()
        .map(|dir| dir.join(path))
        .chain(std::iter::once(path.to_path_buf()))
        .find(|p| is_usable(p))
}

fn is_usable(path: &Path) -> bool {
    matches!(std::fs::metadata(path), Ok(meta) if meta.is_file() && meta.len() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_references_count_as_loaded() {
        assert_eq!(probe("https://img.example/zywoo.png", &[]), AssetStatus::Loaded);
        assert_eq!(probe("HTTP://img.example/zywoo.png", &[]), AssetStatus::Loaded);
    }

    #[test]
    fn empty_reference_fails() {
        assert_eq!(probe("  ", &[]), AssetStatus::Failed);
    }

    #[test]
    fn local_file_checked_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("ropz.png");
        std::fs::write(&img, [0x89, b'P', b'N', b'G']).unwrap();
        assert_eq!(probe(img.to_str().unwrap(), &[]), AssetStatus::Loaded);

        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();
        assert_eq!(probe(empty.to_str().unwrap(), &[]), AssetStatus::Failed);

        assert_eq!(probe(dir.path().join("nope.png").to_str().unwrap(), &[]), AssetStatus::Failed);
        assert_eq!(probe(dir.path().to_str().unwrap(), &[]), AssetStatus::Failed);
    }

    #[test]
    fn relative_reference_resolves_against_search_dirs() {
        let empty = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(data.path().join("assets/headshots")).unwrap();
        let img = data.path().join("assets/headshots/broky.png");
        std::fs::write(&img, [0x89, b'P', b'N', b'G']).unwrap();

        let dirs = vec![empty.path().to_path_buf(), data.path().to_path_buf()];
        assert_eq!(probe("assets/headshots/broky.png", &dirs), AssetStatus::Loaded);
        assert_eq!(locate("assets/headshots/broky.png", &dirs), Some(img));
        assert_eq!(probe("assets/headshots/broky.png", &dirs[..1]), AssetStatus::Failed);
    }
}
