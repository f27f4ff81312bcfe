//! MXL file handler — reads compressed MusicXML (.mxl) archives.
//!
//! An .mxl file is a ZIP archive containing:
//!   - META-INF/container.xml  — declares the root MusicXML file path
//!   - <rootfile>.xml          — the actual MusicXML content (e.g., score.xml)
//!   - (optional) other files  — images, sounds, etc.

use std::io::{Cursor, Read};

use log::debug;
use zip::ZipArchive;

use crate::error::{Result, ScoreError};
use crate::model::Score;
use crate::parser;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Read and parse a .mxl file from raw bytes.
pub fn parse_mxl(data: &[u8]) -> Result<Score> {
    let xml = extract_musicxml_from_mxl(data)?;
    parser::parse_musicxml(&xml)
}

/// Extract the MusicXML content string from .mxl bytes.
pub fn extract_musicxml_from_mxl(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let root_file_path = find_root_file(&mut archive)?;
    debug!("MXL root file: {root_file_path}");
    read_entry(&mut archive, &root_file_path)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|source| ScoreError::Io {
            path: name.to_string(),
            source,
        })?;
    Ok(text)
}

/// Locate the root MusicXML file, preferring the container declaration.
fn find_root_file(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    let has_container = archive.file_names().any(|n| n == CONTAINER_PATH);
    if has_container {
        let xml = read_entry(archive, CONTAINER_PATH)?;
        let doc = roxmltree::Document::parse(&xml)?;
        return doc
            .descendants()
            .filter(|n| n.tag_name().name() == "rootfile")
            .find_map(|n| n.attribute("full-path"))
            .map(String::from)
            .ok_or_else(|| ScoreError::MissingRootFile(vec![CONTAINER_PATH.to_string()]));
    }

    // No container: first .xml / .musicxml outside META-INF
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    let found = names
        .iter()
        .find(|name| {
            !name.starts_with("META-INF/")
                && (name.ends_with(".xml") || name.ends_with(".musicxml"))
        })
        .cloned();
    match found {
        Some(name) => Ok(name),
        None => Err(ScoreError::MissingRootFile(names)),
    }
}
