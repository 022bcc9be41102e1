#![deny(warnings)]

//! Save files for the dealer network.
//!
//! Binary saves are a 4-byte magic, a little-endian `u16` format version and
//! a bincode body. JSON is supported for inspection and hand edits.

use anyhow::{bail, Context, Result};
use deal_runtime::SaveState;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MAGIC: [u8; 4] = *b"DLRS";
pub const FORMAT_VERSION: u16 = 1;

/// Location of a save slot relative to the working directory.
pub fn default_save_path(slot: &str) -> PathBuf {
    PathBuf::from("./saves").join(format!("{slot}.sav"))
}

pub fn encode(save: &SaveState) -> Result<Vec<u8>> {
    let body = bincode::serialize(save).context("encoding save")?;
    let mut out = Vec::with_capacity(MAGIC.len() + 2 + body.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<SaveState> {
    if bytes.len() < MAGIC.len() + 2 || bytes[..4] != MAGIC {
        bail!("not a save file");
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        bail!("unsupported save version {version}, expected {FORMAT_VERSION}");
    }
    bincode::deserialize(&bytes[6..]).context("decoding save body")
}

/// Write a binary save, creating parent directories. The file is replaced
/// atomically through a sibling temp file.
pub fn save_binary(path: &Path, save: &SaveState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let bytes = encode(save)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), day = save.elapsed_days, "game saved");
    Ok(())
}

pub fn load_binary(path: &Path) -> Result<SaveState> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let save = decode(&bytes).with_context(|| format!("loading {}", path.display()))?;
    info!(path = %path.display(), day = save.elapsed_days, "game loaded");
    Ok(save)
}

pub fn to_json(save: &SaveState) -> Result<String> {
    Ok(serde_json::to_string_pretty(save)?)
}

pub fn from_json(json: &str) -> Result<SaveState> {
    serde_json::from_str(json).context("parsing JSON save")
}

/// Load either format, choosing by extension (`.json` is JSON, anything else binary).
pub fn load_any(path: &Path) -> Result<SaveState> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            from_json(&text)
        }
        _ => load_binary(path),
    }
}

/// Write either format, choosing by extension.
pub fn save_any(path: &Path, save: &SaveState) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, to_json(save)?).with_context(|| format!("writing {}", path.display()))
        }
        _ => save_binary(path, save),
    }
}
