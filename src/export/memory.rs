//! In-memory archive container
//!
//! The concrete [`ArchiveContainer`] binding used by tests and the default
//! library consumers. Serialization is deterministic: entries in name
//! order, length-prefixed, little-endian. A write-order log records entry
//! names in the order they were written.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};

use super::ArchiveContainer;
use crate::error::{FrqError, Result};

/// In-memory archive with deterministic serialization
#[derive(Debug, Default, Clone)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Vec<u8>>,
    write_log: Vec<String>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry insertion, without touching the write log
    pub fn with_entry(mut self, name: &str, bytes: &[u8]) -> Self {
        self.entries.insert(name.to_string(), bytes.to_vec());
        self
    }

    /// Entry names in name order
    pub fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Entry names in the order they were written
    pub fn write_log(&self) -> &[String] {
        &self.write_log
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse an archive previously produced by `serialize`
    pub fn from_serialized(bytes: &[u8]) -> Result<Self> {
        let mut archive = MemoryArchive::new();
        let mut offset = 0usize;
        let count = read_u32(bytes, &mut offset)? as usize;
        for _ in 0..count {
            let name_len = read_u32(bytes, &mut offset)? as usize;
            let name = read_bytes(bytes, &mut offset, name_len)?;
            let name = String::from_utf8(name.to_vec()).map_err(|e| {
                FrqError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("archive entry name is not UTF-8: {}", e),
                ))
            })?;
            let data_len = read_u32(bytes, &mut offset)? as usize;
            let data = read_bytes(bytes, &mut offset, data_len)?;
            archive.entries.insert(name, data.to_vec());
        }
        Ok(archive)
    }
}

fn read_u32(bytes: &[u8], offset: &mut usize) -> Result<u32> {
    let slice = read_bytes(bytes, offset, 4)?;
    Ok(LittleEndian::read_u32(slice))
}

fn read_bytes<'a>(bytes: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).filter(|&end| end <= bytes.len());
    let Some(end) = end else {
        return Err(FrqError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "archive data truncated",
        )));
    };
    let slice = &bytes[*offset..end];
    *offset = end;
    Ok(slice)
}

impl ArchiveContainer for MemoryArchive {
    fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        self.entries.get(name).cloned().ok_or_else(|| {
            FrqError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no archive entry {}", name),
            ))
        })
    }

    fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.entries.insert(name.to_string(), bytes.to_vec());
        self.write_log.push(name.to_string());
        Ok(())
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; 4];
        LittleEndian::write_u32(&mut out[0..4], self.entries.len() as u32);
        let mut len_buf = [0u8; 4];
        for (name, data) in &self.entries {
            LittleEndian::write_u32(&mut len_buf, name.len() as u32);
            out.extend_from_slice(&len_buf);
            out.extend_from_slice(name.as_bytes());
            LittleEndian::write_u32(&mut len_buf, data.len() as u32);
            out.extend_from_slice(&len_buf);
            out.extend_from_slice(data);
        }
        Ok(out)
    }
}
