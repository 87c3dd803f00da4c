//! Plain-text extraction from user attachments.

use crate::error::{Error, Result};
use crate::model::AttachmentKind;
use lopdf::Document;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

const OCR_BIN: &str = "tesseract";
const UPLOAD_SUFFIXES: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "txt"];

fn suffix(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

impl AttachmentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match suffix(path)?.as_str() {
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "pdf" => Some(Self::Pdf),
            "txt" | "csv" => Some(Self::Text),
            _ => None,
        }
    }

    /// Kinds accepted at the upload surface; narrower than what `extract`
    /// understands (no csv).
    pub fn is_uploadable(path: &Path) -> bool {
        suffix(path).is_some_and(|s| UPLOAD_SUFFIXES.contains(&s.as_str()))
    }
}

/// Whether the external OCR executable is reachable.
pub fn ocr_available() -> bool {
    which::which(OCR_BIN).is_ok()
}

pub fn extract(path: &Path) -> Result<String> {
    let kind = AttachmentKind::from_path(path)
        .ok_or_else(|| Error::UnsupportedAttachment(path.display().to_string()))?;

    let text = match kind {
        AttachmentKind::Image => ocr_image(path)?,
        AttachmentKind::Pdf => pdf_text(path)?,
        AttachmentKind::Text => fs::read_to_string(path)?,
    };

    let text = text.trim().to_string();
    tracing::debug!(
        path = %path.display(),
        ?kind,
        chars = text.chars().count(),
        "extracted attachment"
    );
    Ok(text)
}

/// Never fails: every error, including an unsupported kind, becomes an
/// empty string.
pub fn extract_text(path: &Path) -> String {
    match extract(path) {
        Ok(text) => text,
        Err(Error::UnsupportedAttachment(p)) => {
            tracing::debug!(path = %p, "unsupported attachment kind");
            String::new()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "error processing attachment");
            String::new()
        }
    }
}

fn ocr_image(path: &Path) -> Result<String> {
    let out = Command::new(OCR_BIN).arg(path).arg("stdout").output();
    match out {
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::OcrUnavailable),
        Err(e) => Err(Error::Io(e)),
        Ok(o) if !o.status.success() => Err(Error::Ocr(
            String::from_utf8_lossy(&o.stderr).trim().to_string(),
        )),
        Ok(o) => Ok(String::from_utf8_lossy(&o.stdout).into_owned()),
    }
}

fn pdf_text(path: &Path) -> Result<String> {
    let document = Document::load(path)?;
    let mut text = String::new();
    // get_pages is keyed by page number, so iteration follows page order.
    for page_number in document.get_pages().keys() {
        text.push_str(&document.extract_text(&[*page_number])?);
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for body in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*body)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn kind_from_suffix_is_case_insensitive() {
        assert_eq!(
            AttachmentKind::from_path(Path::new("scan.JPEG")),
            Some(AttachmentKind::Image)
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("report.Pdf")),
            Some(AttachmentKind::Pdf)
        );
        assert_eq!(
            AttachmentKind::from_path(Path::new("rows.csv")),
            Some(AttachmentKind::Text)
        );
        assert_eq!(AttachmentKind::from_path(Path::new("memo.docx")), None);
        assert_eq!(AttachmentKind::from_path(Path::new("no_suffix")), None);
    }

    #[test]
    fn upload_surface_excludes_csv() {
        assert!(AttachmentKind::is_uploadable(Path::new("a.TXT")));
        assert!(AttachmentKind::is_uploadable(Path::new("a.png")));
        assert!(!AttachmentKind::is_uploadable(Path::new("a.csv")));
        assert!(!AttachmentKind::is_uploadable(Path::new("a.docx")));
    }

    #[test]
    fn reads_and_trims_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "note.txt", b"\n  patient has fever  \n\n");
        assert_eq!(extract(&path).unwrap(), "patient has fever");
    }

    #[test]
    fn reads_csv_as_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rows.csv", b"a,b\n1,2\n");
        assert_eq!(extract_text(&path), "a,b\n1,2");
    }

    #[test]
    fn unsupported_kind_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "memo.docx", b"PK\x03\x04");

        assert!(matches!(extract(&path), Err(Error::UnsupportedAttachment(_))));
        assert_eq!(extract_text(&path), "");
    }

    #[test]
    fn invalid_utf8_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.txt", &[0xff, 0xfe, 0xfd]);

        assert!(matches!(extract(&path), Err(Error::Io(_))));
        assert_eq!(extract_text(&path), "");
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        assert_eq!(extract_text(Path::new("/no/such/file.txt")), "");
    }

    #[test]
    fn corrupt_pdf_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "broken.pdf", b"this is not a pdf");

        assert!(extract(&path).is_err());
        assert_eq!(extract_text(&path), "");
    }

    #[test]
    fn pdf_pages_are_concatenated_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("two_pages.pdf");
        write_pdf(&path, &["First page", "Second page"]);

        let text = extract(&path).unwrap();
        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
        assert_eq!(text, text.trim());
    }

    #[test]
    fn corrupt_image_never_raises() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "noise.png", b"not really a png");

        // Either tesseract is missing or it rejects the file; both degrade.
        assert_eq!(extract_text(&path), "");
    }
}
