//! In-memory zip archives of page images, and download filenames.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::LetxbeError;

/// Unpacks every file of a zip archive, in archive order.
///
/// Directory entries are skipped.
pub fn unzip_entries(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>, LetxbeError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        entries.push((name, content));
    }
    Ok(entries)
}

/// Packs `(name, bytes)` entries into a deflated zip archive.
pub fn zip_entries<N, B>(entries: impl IntoIterator<Item = (N, B)>) -> Result<Vec<u8>, LetxbeError>
where
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer.start_file(name.as_ref(), options)?;
        writer.write_all(bytes.as_ref())?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Extracts the filename from a `content-disposition` header value.
///
/// Accepts quoted and bare values (`attachment; filename="a.pdf"`,
/// `attachment; filename=a.pdf`). Returns `None` when no usable name is found.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let start = header.find("filename=")? + "filename=".len();
    let value = header[start..].split(';').next()?.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_then_unzip_preserves_order() {
        let entries = vec![
            ("task_2.png", b"second".to_vec()),
            ("task_0.png", b"first".to_vec()),
            ("task_1.png", Vec::new()),
        ];
        let archive = zip_entries(entries.iter().map(|(n, b)| (*n, b.as_slice()))).unwrap();
        let unpacked = unzip_entries(&archive).unwrap();
        let names: Vec<&str> = unpacked.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["task_2.png", "task_0.png", "task_1.png"]);
        assert_eq!(unpacked[0].1, b"second");
        assert!(unpacked[2].1.is_empty());
    }

    #[test]
    fn test_unzip_rejects_garbage() {
        let err = unzip_entries(b"definitely not a zip").expect_err("should fail");
        assert!(matches!(err, LetxbeError::Zip(_)));
    }

    #[test]
    fn test_filename_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"invoice.pdf\""),
            Some("invoice.pdf".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=scan.png; size=12"),
            Some("scan.png".to_string())
        );
        assert_eq!(filename_from_content_disposition("attachment"), None);
        assert_eq!(filename_from_content_disposition("attachment; filename=\"\""), None);
    }
}
