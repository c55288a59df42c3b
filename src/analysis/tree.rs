// Repository tree walking
//
// Builds an in-memory tree of the checked-out repository, one directory
// listing at a time. Each recursive call returns a finished subtree.

use crate::analysis::language::Language;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Entry names that are never listed nor descended into
pub const IGNORED_NAMES: [&str; 3] = [".git", "node_modules", "__pycache__"];

/// One filesystem entry of the analyzed repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Directory {
        name: String,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        size: u64,
        language: Language,
        /// Path relative to the walk root, `/`-separated
        path: String,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    /// Children of a directory; files have none
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Directory { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 1,
            TreeNode::Directory { children, .. } => children.iter().map(|c| c.file_count()).sum(),
        }
    }

    /// Number of directories in this subtree, including this one
    pub fn dir_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 0,
            TreeNode::Directory { children, .. } => {
                1 + children.iter().map(|c| c.dir_count()).sum::<usize>()
            }
        }
    }

    /// Total bytes of all files in this subtree
    pub fn total_size(&self) -> u64 {
        match self {
            TreeNode::File { size, .. } => *size,
            TreeNode::Directory { children, .. } => children.iter().map(|c| c.total_size()).sum(),
        }
    }

    /// Find a node by its `/`-separated path below this one
    pub fn find(&self, relative: &str) -> Option<&TreeNode> {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |node, part| {
                node.children().iter().find(|c| c.name() == part)
            })
    }
}

/// Check whether an entry name belongs to the ignore-set
pub fn is_ignored(name: &OsStr) -> bool {
    name.to_str().map_or(false, |n| IGNORED_NAMES.contains(&n))
}

/// Walk a directory and build its tree.
///
/// Any error listing or stating an entry aborts the whole walk; no partial
/// tree is ever returned. Symbolic links are not followed and appear as files.
pub fn walk(root: &Path) -> Result<TreeNode> {
    if !root.exists() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::invalid_input(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let name = match root.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => root
            .canonicalize()?
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string()),
    };

    walk_dir(root, root, name)
}

fn walk_dir(root: &Path, dir: &Path, name: String) -> Result<TreeNode> {
    let children = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry.file_name()))
        .map(|entry| build_node(root, entry?))
        .collect::<Result<Vec<_>>>()?;

    Ok(TreeNode::Directory { name, children })
}

fn build_node(root: &Path, entry: DirEntry) -> Result<TreeNode> {
    let name = entry.file_name().to_string_lossy().into_owned();

    if entry.file_type().is_dir() {
        return walk_dir(root, entry.path(), name);
    }

    let metadata = entry.metadata()?;
    Ok(TreeNode::File {
        language: Language::classify(&name),
        size: metadata.len(),
        path: relative_path(root, entry.path()),
        name,
    })
}

/// Path of `path` below `root`, joined with `/` regardless of platform
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
