#![deny(warnings)]

//! Catalog pack loading: one base catalog file plus drop-in packs.
//!
//! Every `*.json`, `*.yaml` or `*.yml` file next to the base file is a pack
//! with the same shape as the base catalog. Packs are merged in file-name
//! order; a dealer whose name is already known is skipped (first file wins).

use deal_core::{Catalog, ValidationError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(String),
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid catalog: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

/// A file that contributed to the current catalog.
#[derive(Debug, Clone)]
pub struct LoadedPack {
    pub path: PathBuf,
    pub mtime: SystemTime,
    /// Dealers this file actually added.
    pub dealers: Vec<String>,
}

/// Loads and merges catalog packs from one directory.
pub struct PackLoader {
    root: PathBuf,
    base: String,
    packs: Vec<LoadedPack>,
}

impl PackLoader {
    /// `base` is the file name of the base catalog inside `root`.
    pub fn new<P: AsRef<Path>>(root: P, base: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base: base.to_string(),
            packs: vec![],
        }
    }

    pub fn packs(&self) -> &[LoadedPack] {
        &self.packs
    }

    /// Load the base file and merge every pack. A missing or malformed base
    /// file is an error; a malformed pack is logged and skipped.
    pub fn load(&mut self) -> Result<Catalog, LoadError> {
        let base_path = self.root.join(&self.base);
        let mut catalog = parse_file(&base_path)?;
        let mut packs = vec![LoadedPack {
            mtime: mtime(&base_path),
            dealers: catalog.dealers.iter().map(|d| d.name.clone()).collect(),
            path: base_path.clone(),
        }];

        for path in self.pack_files()? {
            if path == base_path {
                continue;
            }
            let pack = match parse_file(&path) {
                Ok(pack) => pack,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping malformed pack");
                    continue;
                }
            };
            let offered: Vec<String> = pack.dealers.iter().map(|d| d.name.clone()).collect();
            let skipped = catalog.merge(pack);
            for name in &skipped {
                warn!(path = %path.display(), dealer = %name, "dealer already defined, skipping");
            }
            packs.push(LoadedPack {
                mtime: mtime(&path),
                dealers: offered.into_iter().filter(|n| !skipped.contains(n)).collect(),
                path,
            });
        }

        catalog.validate()?;
        info!(
            dealers = catalog.dealers.len(),
            packs = packs.len(),
            "catalog loaded"
        );
        self.packs = packs;
        Ok(catalog)
    }

    /// Reload when a pack was added, removed or modified since the last load.
    pub fn reload_if_changed(&mut self) -> Result<Option<Catalog>, LoadError> {
        let mut current: BTreeMap<PathBuf, SystemTime> = BTreeMap::new();
        let base_path = self.root.join(&self.base);
        current.insert(base_path.clone(), mtime(&base_path));
        for path in self.pack_files()? {
            let t = mtime(&path);
            current.insert(path, t);
        }
        let known: BTreeMap<PathBuf, SystemTime> = self
            .packs
            .iter()
            .map(|p| (p.path.clone(), p.mtime))
            .collect();
        if current == known {
            return Ok(None);
        }
        info!(root = %self.root.display(), "catalog packs changed, reloading");
        self.load().map(Some)
    }

    fn pack_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();
        for ent in fs::read_dir(&self.root)? {
            let ent = ent?;
            if !ent.file_type()?.is_file() {
                continue;
            }
            let path = ent.path();
            if is_pack(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_pack(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Parse a single catalog file, choosing the format from its extension.
pub fn parse_file(path: &Path) -> Result<Catalog, LoadError> {
    let text = fs::read_to_string(path)?;
    let parse_err = |message: String| LoadError::Parse {
        path: path.display().to_string(),
        message,
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&text).map_err(|e| parse_err(e.to_string()))
        }
        _ => serde_json::from_str(&text).map_err(|e| parse_err(e.to_string())),
    }
}
