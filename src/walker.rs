//! Recursive directory walker with a name-based exclusion set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

/// Return every file path under `root`, skipping any entry (and its entire
/// subtree) whose file name matches one of `excluded_names` exactly. Results
/// are sorted for stable ordering; unreadable entries are silently skipped.
pub fn walk_directory(root: &Path, excluded_names: &[String]) -> Result<Vec<PathBuf>> {
    let excluded: HashSet<&str> = excluded_names.iter().map(|s| s.as_str()).collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            // The root itself is always walked, whatever it is named.
            e.depth() == 0
                || e.file_name()
                    .to_str()
                    .map(|name| !excluded.contains(name))
                    .unwrap_or(true)
        })
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn lists_every_file_recursively() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/b.png")).unwrap();
        File::create(dir.path().join("sub/notes.txt")).unwrap();

        let files = walk_directory(dir.path(), &[]).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn excluded_directory_prunes_the_whole_subtree() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();
        fs::create_dir(dir.path().join(".thumbnails")).unwrap();
        File::create(dir.path().join(".thumbnails/cached.jpg")).unwrap();
        fs::create_dir(dir.path().join(".thumbnails/deep")).unwrap();
        File::create(dir.path().join(".thumbnails/deep/x.jpg")).unwrap();

        let files = walk_directory(dir.path(), &[".thumbnails".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.jpg"));
    }

    #[test]
    fn excluded_file_names_are_skipped_too() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();
        File::create(dir.path().join(".DS_Store")).unwrap();

        let files = walk_directory(dir.path(), &[".DS_Store".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn exclusion_does_not_apply_to_the_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(".thumbnails");
        fs::create_dir(&root).unwrap();
        File::create(root.join("a.jpg")).unwrap();

        let files = walk_directory(&root, &[".thumbnails".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
