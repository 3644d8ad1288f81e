//! Structure documents on disk.
//!
//! Two encodings are supported: pretty JSON (`*.json`) for hand-edited and
//! version-controlled designs, and a compact binary form (`*.nhdl`) made of
//! the magic bytes `NODALHDL`, a little-endian `u32` format version and a
//! bincode payload.

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::Structure;

const MAGIC: &[u8; 8] = b"NODALHDL";
const FORMAT_VERSION: u32 = 1;
/// Largest bincode payload accepted. Length prefixes beyond it fail to decode
/// instead of allocating.
const PAYLOAD_LIMIT: usize = 64 * 1024 * 1024;

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<PAYLOAD_LIMIT>()
}

/// Extension used for the binary encoding.
pub const BINARY_EXTENSION: &str = "nhdl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDoc {
    #[serde(default = "default_version")]
    pub version: u32,
    pub structure: Structure,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

impl StructureDoc {
    pub fn new(structure: Structure) -> Self {
        Self {
            version: FORMAT_VERSION,
            structure,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let doc: StructureDoc =
            serde_json::from_str(text).context("Failed to parse structure document")?;
        if doc.version != FORMAT_VERSION {
            anyhow::bail!("Unsupported document version: {}", doc.version);
        }
        Ok(doc)
    }

    pub fn save_json(&self, path: &Utf8Path) -> Result<()> {
        std::fs::write(path, self.to_json()?).with_context(|| format!("Write {}", path))
    }

    pub fn load_json(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
        Self::from_json(&text).with_context(|| format!("Failed to load {}", path))
    }

    /// Save the document to a binary file with magic bytes and versioning.
    pub fn save_binary(&self, path: &Utf8Path) -> Result<()> {
        let file = std::fs::File::create(path).with_context(|| format!("Create {}", path))?;
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::serde::encode_into_std_write(self, &mut writer, bincode_config())?;
        writer.flush()?;
        Ok(())
    }

    /// Load a binary document, checking magic bytes and version.
    pub fn load_binary(path: &Utf8Path) -> Result<Self> {
        let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
        let mut reader = std::io::BufReader::new(file);
        let mut magic = [0u8; 8];
        reader
            .read_exact(&mut magic)
            .with_context(|| format!("{} is too short", path))?;
        if &magic != MAGIC {
            anyhow::bail!("Invalid magic bytes in {}: expected 'NODALHDL'", path);
        }
        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != FORMAT_VERSION {
            anyhow::bail!("Unsupported version: {}", version);
        }
        let doc: StructureDoc =
            bincode::serde::decode_from_std_read(&mut reader, bincode_config())
                .with_context(|| format!("Failed to decode {}", path))?;
        Ok(doc)
    }

    /// Load by extension: `.nhdl` is binary, anything else JSON.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if path.extension() == Some(BINARY_EXTENSION) {
            Self::load_binary(path)
        } else {
            Self::load_json(path)
        }
    }

    /// Save by extension, mirroring [`StructureDoc::load`].
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| format!("Create {}", parent))?;
            }
        }
        if path.extension() == Some(BINARY_EXTENSION) {
            self.save_binary(path)
        } else {
            self.save_json(path)
        }
    }
}
