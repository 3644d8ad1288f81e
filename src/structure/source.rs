//! Content source abstraction for reading structure documents from a directory
//! or from a zip bundle.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{Read, Seek};

use super::{Structure, StructureDoc};

/// Trait for abstracting document I/O (filesystem vs. zip bundle).
pub trait ContentSource {
    /// Read a file at the given logical path and return its content as a string.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
    /// List every file the source contains, as logical paths.
    fn list_files(&mut self) -> Result<Vec<Utf8PathBuf>>;
}

/// Reads files below a root directory on the local filesystem.
pub struct FsSource {
    root: Utf8PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full).with_context(|| format!("Failed to read {}", full))
    }

    fn list_files(&mut self) -> Result<Vec<Utf8PathBuf>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root) {
            let entry = entry.with_context(|| format!("Walk {}", self.root))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let p = Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(|p| anyhow::anyhow!("Non-UTF8 path {}", p.display()))?;
            let rel = match p.strip_prefix(&self.root) {
                Ok(r) => r.to_path_buf(),
                Err(_) => p.clone(),
            };
            files.push(rel);
        }
        files.sort();
        Ok(files)
    }
}

/// Reads files from a zip bundle of structure documents.
pub struct ZipSource<R: Read + Seek> {
    zip: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader).context("Failed to open zip archive")?;
        Ok(Self { zip })
    }
}

impl<R: Read + Seek> ContentSource for ZipSource<R> {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let p = path
            .as_str()
            .trim_start_matches("./")
            .trim_start_matches('/')
            .to_string();
        let mut f = self
            .zip
            .by_name(&p)
            .with_context(|| format!("File {} not found in zip", p))?;
        let mut s = String::new();
        f.read_to_string(&mut s)
            .with_context(|| format!("Failed to read {} from zip", p))?;
        Ok(s)
    }

    fn list_files(&mut self) -> Result<Vec<Utf8PathBuf>> {
        let mut files: Vec<Utf8PathBuf> = self
            .zip
            .file_names()
            .filter(|n| !n.ends_with('/'))
            .map(Utf8PathBuf::from)
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Read and parse a JSON structure document from `source`.
pub fn load_structure<S: ContentSource + ?Sized>(
    source: &mut S,
    path: &Utf8Path,
) -> Result<Structure> {
    let text = source.read_to_string(path)?;
    let doc = StructureDoc::from_json(&text).with_context(|| format!("Failed to load {}", path))?;
    Ok(doc.structure)
}
