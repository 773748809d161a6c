use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::compiler::{FoldArtifact, fold_sources};
use crate::error::CoreError;
use crate::span::FileId;

/// Extension of constant-declaration source files.
pub const SOURCE_EXTENSION: &str = "kst";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// Path relative to the package root.
    pub path: PathBuf,
    pub contents: String,
}

/// A directory of `.kst` files folded as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub root: PathBuf,
    /// Sorted by path; a file's index is its [`FileId`].
    pub files: Vec<PackageFile>,
}

impl Package {
    /// Folds the files in order, sharing one set of constants.
    pub fn fold(&self) -> Result<FoldArtifact, CoreError> {
        fold_sources(self.files.iter().map(|file| file.contents.as_str()))
    }

    pub fn file(&self, id: FileId) -> Option<&PackageFile> {
        self.files.get(id.0 as usize)
    }
}

pub fn load_package(root: impl AsRef<Path>) -> Result<Package, CoreError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(CoreError::MissingPackage(root.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            let contents = fs::read_to_string(path)?;
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.push(PackageFile {
                path: relative,
                contents,
            });
        }
    }
    Ok(Package {
        root: root.to_path_buf(),
        files,
    })
}

pub fn fold_package(root: impl AsRef<Path>) -> Result<FoldArtifact, CoreError> {
    load_package(root)?.fold()
}
