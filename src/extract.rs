//! Text extraction for uploaded files.
//!
//! PDFs are read page-by-page with `lopdf`, skipping pages whose content
//! cannot be decoded. Anything else is treated as UTF-8 text, decoded
//! leniently.

use lopdf::Document;

use crate::errors::ApiError;

const PDF_MAGIC: &[u8] = b"%PDF";

pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("empty upload".to_string()));
    }

    if is_pdf(filename, bytes) {
        extract_pdf_text(bytes)
    } else {
        Ok(decode_utf8_lossy(bytes))
    }
}

fn is_pdf(filename: &str, bytes: &[u8]) -> bool {
    filename.to_lowercase().ends_with(".pdf") || bytes.starts_with(PDF_MAGIC)
}

fn decode_utf8_lossy(bytes: &[u8]) -> String {
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ApiError> {
    let doc = Document::load_mem(bytes)
        .map_err(|err| ApiError::BadRequest(format!("could not parse PDF: {err}")))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim().to_string()),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(page = *page_number, "skipping unreadable PDF page: {err}");
            }
        }
    }

    if pages.is_empty() {
        return Err(ApiError::BadRequest(
            "no extractable text in PDF".to_string(),
        ));
    }

    Ok(pages.join("\n\n"))
}
