use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::WalkConfig;
use crate::models::DataFile;

/// Collect data files under `root`.
///
/// Subdirectories are visited depth-first before the files of the directory
/// that contains them, and siblings are visited in name order, so a
/// directory's files always come after everything beneath it. With
/// `base_only` only the files directly in `root` are returned.
///
/// Symlinks are skipped unless `walk.follow_symlinks` is set, in which case
/// linked files are collected and linked directories are descended into.
pub fn discover(root: &Path, walk: &WalkConfig, base_only: bool) -> Result<Vec<DataFile>> {
    if !root.is_dir() {
        bail!("Data root does not exist or is not a directory: {}", root.display());
    }

    let mut excludes = vec!["**/.git/**".to_string()];
    excludes.extend(walk.exclude_globs.clone());
    let exclude_set = build_globset(&excludes)?;

    let mut walker = WalkDir::new(root)
        .follow_links(walk.follow_symlinks)
        .contents_first(true)
        .sort_by(dirs_first);
    if base_only {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.contains(walk.data_suffix.as_str()) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if exclude_set.is_match(&relative_path) {
            continue;
        }

        let dir = path.parent().unwrap_or(root).to_path_buf();
        debug!(file = %relative_path, level = entry.depth() - 1, "found data file");

        files.push(DataFile {
            path: path.to_path_buf(),
            dir,
            file_name,
            relative_path,
            level: entry.depth() - 1,
        });
    }

    Ok(files)
}

fn dirs_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Name used as the first segment of stored file paths: the configured
/// prefix, else the root directory's own name.
pub fn root_label(root: &Path, walk: &WalkConfig) -> String {
    if let Some(prefix) = &walk.path_prefix {
        return prefix.trim_matches('/').to_string();
    }
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        })
        .unwrap_or_default()
}

/// Stored `filepath` for a file: `/<label>/<relative path>`.
pub fn stored_filepath(label: &str, relative_path: &str) -> String {
    if label.is_empty() {
        format!("/{}", relative_path)
    } else {
        format!("/{}/{}", label, relative_path)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[DataFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::create_dir_all(root.join("other")).unwrap();
        fs::write(root.join("a.dat"), "x\n1\n").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join("meta-data.json"), "{}").unwrap();
        fs::write(root.join("sub/b.dat"), "x\n1\n").unwrap();
        fs::write(root.join("sub/deeper/c.dat"), "x\n1\n").unwrap();
        fs::write(root.join("other/d.dat"), "x\n1\n").unwrap();
        tmp
    }

    #[test]
    fn test_recursive_order() {
        let tmp = tree();
        let cfg = Config::minimal(tmp.path());
        let files = discover(tmp.path(), &cfg.walk, false).unwrap();
        assert_eq!(
            names(&files),
            vec!["other/d.dat", "sub/deeper/c.dat", "sub/b.dat", "a.dat"]
        );
        assert_eq!(files[1].level, 2);
        assert_eq!(files[3].level, 0);
        assert_eq!(files[2].dir, tmp.path().join("sub"));
        assert_eq!(files[2].file_name, "b.dat");
    }

    #[test]
    fn test_base_only() {
        let tmp = tree();
        let cfg = Config::minimal(tmp.path());
        let files = discover(tmp.path(), &cfg.walk, true).unwrap();
        assert_eq!(names(&files), vec!["a.dat"]);
    }

    #[test]
    fn test_suffix_is_substring_match() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("run.dat.bak"), "x\n").unwrap();
        fs::write(tmp.path().join("run.csv"), "x\n").unwrap();
        let cfg = Config::minimal(tmp.path());
        let files = discover(tmp.path(), &cfg.walk, false).unwrap();
        assert_eq!(names(&files), vec!["run.dat.bak"]);
    }

    #[test]
    fn test_exclude_globs() {
        let tmp = tree();
        let mut cfg = Config::minimal(tmp.path());
        cfg.walk.exclude_globs = vec!["sub/**".to_string()];
        let files = discover(tmp.path(), &cfg.walk, false).unwrap();
        assert_eq!(names(&files), vec!["other/d.dat", "a.dat"]);
    }

    #[test]
    fn test_git_dir_excluded() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join(".git/x.dat"), "x\n").unwrap();
        let cfg = Config::minimal(tmp.path());
        assert!(discover(tmp.path(), &cfg.walk, false).unwrap().is_empty());
    }

    #[cfg(unix)]
    fn linked_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside");
        let root = tmp.path().join("root");
        fs::create_dir_all(&outside).unwrap();
        fs::create_dir_all(&root).unwrap();
        fs::write(outside.join("target.dat"), "x\n1\n").unwrap();
        fs::write(root.join("real.dat"), "x\n1\n").unwrap();
        std::os::unix::fs::symlink(outside.join("target.dat"), root.join("link.dat")).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("linked-dir")).unwrap();
        tmp
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped_by_default() {
        let tmp = linked_tree();
        let root = tmp.path().join("root");
        let cfg = Config::minimal(&root);
        assert!(!cfg.walk.follow_symlinks);
        let files = discover(&root, &cfg.walk, false).unwrap();
        assert_eq!(names(&files), vec!["real.dat"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_followed_when_enabled() {
        let tmp = linked_tree();
        let root = tmp.path().join("root");
        let mut cfg = Config::minimal(&root);
        cfg.walk.follow_symlinks = true;
        let files = discover(&root, &cfg.walk, false).unwrap();
        assert_eq!(
            names(&files),
            vec!["linked-dir/target.dat", "link.dat", "real.dat"]
        );
        assert_eq!(files[1].path, root.join("link.dat"));
    }

    #[test]
    fn test_missing_root() {
        let cfg = Config::minimal("/nonexistent/data");
        let err = discover(Path::new("/nonexistent/data"), &cfg.walk, false).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_root_label_and_filepath() {
        let cfg = Config::minimal("../../sample-data");
        let label = root_label(Path::new("../../sample-data"), &cfg.walk);
        assert_eq!(label, "sample-data");
        assert_eq!(
            stored_filepath(&label, "2020-07-31/gui.dat"),
            "/sample-data/2020-07-31/gui.dat"
        );
        assert_eq!(stored_filepath("", "a.dat"), "/a.dat");
    }

    #[test]
    fn test_root_label_prefix_override() {
        let mut cfg = Config::minimal("/data/x");
        cfg.walk.path_prefix = Some("/archive/".to_string());
        assert_eq!(root_label(Path::new("/data/x"), &cfg.walk), "archive");
    }
}
