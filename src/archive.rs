use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One catalog destined for the output archive.
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    pub name: String,
    pub contents: String,
}

impl ArchiveMember {
    pub fn po(language: &str, contents: String) -> Self {
        Self {
            name: format!("{language}.po"),
            contents,
        }
    }
}

/// Builds the archive in memory, one deflated member per catalog.
pub fn build_archive(members: &[ArchiveMember]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for member in members {
        writer
            .start_file(member.name.as_str(), options)
            .with_context(|| format!("failed to start archive member: {}", member.name))?;
        writer
            .write_all(member.contents.as_bytes())
            .with_context(|| format!("failed to write archive member: {}", member.name))?;
    }
    let cursor = writer.finish().with_context(|| "failed to finish archive")?;
    Ok(cursor.into_inner())
}

pub fn write_archive(path: &Path, members: &[ArchiveMember]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create archive: {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for member in members {
        writer
            .start_file(member.name.as_str(), options)
            .with_context(|| format!("failed to start archive member: {}", member.name))?;
        writer
            .write_all(member.contents.as_bytes())
            .with_context(|| format!("failed to write archive member: {}", member.name))?;
    }
    writer.finish().with_context(|| "failed to finish archive")?;
    Ok(())
}
