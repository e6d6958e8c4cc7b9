//! Resume text extraction.
//!
//! Dispatches on the file extension: PDF through pdf-extract, DOCX/DOC by
//! reading `word/document.xml` out of the zip container, TXT as plain UTF-8.
//! Extraction parses whole documents, so the async entry point runs it on the
//! blocking pool.

use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

/// File extensions the pipeline accepts, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "txt"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported resume format '{0}'")]
    UnsupportedFormat(String),
    #[error("text extraction failed: {0}")]
    Failed(String),
}

fn extension(path: &Path) -> Result<String, ExtractError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))
}

/// Reject files the extractors cannot handle before anything is stored.
pub fn ensure_supported(path: &Path) -> Result<(), ExtractError> {
    let ext = extension(path)?;
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ExtractError::UnsupportedFormat(ext))
    }
}

/// Extract plain text from a resume file, trimmed of surrounding whitespace.
/// Empty output is not an error; the evaluator scores whatever is there.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let text = match extension(path)?.as_str() {
        "pdf" => extract_pdf(path)?,
        "docx" | "doc" => extract_docx(path)?,
        "txt" => extract_txt(path)?,
        other => return Err(ExtractError::UnsupportedFormat(other.to_string())),
    };
    Ok(text.trim().to_string())
}

/// `extract_text` on the blocking pool.
pub async fn extract_text_async(path: PathBuf) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&path))
        .await
        .map_err(|err| ExtractError::Failed(format!("extraction task panicked: {err}")))?
}

fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text(path)
        .map_err(|err| ExtractError::Failed(format!("pdf: {err}")))?;
    // pdf-extract separates pages with form feeds
    Ok(text.replace('\x0c', "\n"))
}

/// Pull every `<w:t>` text node out of the main document part, joined with
/// single spaces. Legacy `.doc` files go through the same path and fail as
/// `Failed` when they are not a zip container.
fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let file = std::fs::File::open(path)
        .map_err(|err| ExtractError::Failed(format!("open {}: {err}", path.display())))?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| ExtractError::Failed(format!("docx zip: {err}")))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|err| ExtractError::Failed(format!("docx zip: {err}")))?
        .read_to_string(&mut document_xml)
        .map_err(|err| ExtractError::Failed(format!("docx xml: {err}")))?;

    let mut reader = Reader::from_str(&document_xml);
    let mut text = String::new();
    let mut in_text_node = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref el)) if el.local_name().as_ref() == b"t" => in_text_node = true,
            Ok(Event::End(ref el)) if el.local_name().as_ref() == b"t" => in_text_node = false,
            Ok(Event::Text(ref node)) if in_text_node => {
                let decoded = node
                    .unescape()
                    .map_err(|err| ExtractError::Failed(format!("docx xml: {err}")))?;
                let value = decoded.trim();
                if !value.is_empty() {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(value);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(ExtractError::Failed(format!("docx xml: {err}"))),
        }
        buf.clear();
    }

    Ok(text)
}

fn extract_txt(path: &Path) -> Result<String, ExtractError> {
    std::fs::read_to_string(path).map_err(|err| ExtractError::Failed(format!("txt: {err}")))
}
