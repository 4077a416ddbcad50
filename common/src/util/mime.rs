use std::{path::Path, str::FromStr};

use mime::Mime;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
const SIGNATURE_WINDOW: usize = 1024;

/// Content inspection: a PDF carries `%PDF-` within its first kilobyte.
pub fn is_pdf(content: &[u8]) -> bool {
    let window = &content[..content.len().min(SIGNATURE_WINDOW)];
    window.windows(PDF_SIGNATURE.len()).any(|candidate| candidate == PDF_SIGNATURE)
}

pub fn get_content_type(mime_type: Option<&str>, filename: &str) -> Mime {
    if let Some(mime_type) = mime_type {
        if let Ok(content_type) = Mime::from_str(mime_type) {
            return content_type;
        }
    }
    if let Some(extension) = Path::new(filename).extension() {
        if let Some(extension) = extension.to_str() {
            return match extension.to_ascii_lowercase().as_str() {
                "pdf" => mime::APPLICATION_PDF,
                "png" => mime::IMAGE_PNG,
                "jpg" => mime::IMAGE_JPEG,
                "jpeg" => mime::IMAGE_JPEG,
                _ => mime::APPLICATION_OCTET_STREAM,
            };
        }
    }
    mime::APPLICATION_OCTET_STREAM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf_signature() {
        assert!(is_pdf(b"%PDF-1.7\n%\xe2\xe3"));
        assert!(is_pdf(b"\xef\xbb\xbf  %PDF-1.4"));
    }

    #[test]
    fn rejects_non_pdf_content() {
        assert!(!is_pdf(b""));
        assert!(!is_pdf(b"hello world, this is plain text"));
        assert!(!is_pdf(b"%PD"));
    }

    #[test]
    fn ignores_signature_beyond_window() {
        let mut content = vec![b' '; 2048];
        content.extend_from_slice(b"%PDF-1.7");
        assert!(!is_pdf(&content));
    }

    #[test]
    fn content_type_prefers_declared_mime() {
        assert_eq!(get_content_type(Some("application/pdf"), "x.bin"), mime::APPLICATION_PDF);
        assert_eq!(get_content_type(None, "scan.PDF"), mime::APPLICATION_PDF);
        assert_eq!(get_content_type(Some("garbage"), "notes.txt"), mime::APPLICATION_OCTET_STREAM);
    }
}
