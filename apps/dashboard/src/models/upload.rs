use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;

/// A resume file selected for upload. Selection order is preserved by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?
            .to_string();
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Ok(Self::new(file_name, content))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Size in KB with one decimal, e.g. `12.3 KB`.
    pub fn size_display(&self) -> String {
        format!("{:.1} KB", self.size() as f64 / 1024.0)
    }

    pub fn content_type(&self) -> &'static str {
        let lower_name = self.file_name.to_lowercase();
        if lower_name.ends_with(".pdf") {
            "application/pdf"
        } else if lower_name.ends_with(".docx") {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        } else if lower_name.ends_with(".txt") {
            "text/plain"
        } else {
            "application/octet-stream"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(UploadedFile::new("CV.PDF", "x").content_type(), "application/pdf");
        assert_eq!(UploadedFile::new("cv.txt", "x").content_type(), "text/plain");
        assert_eq!(
            UploadedFile::new("cv.odt", "x").content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_size_display() {
        let file = UploadedFile::new("cv.pdf", vec![0u8; 2048 + 307]);
        assert_eq!(file.size(), 2355);
        assert_eq!(file.size_display(), "2.3 KB");
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane_doe.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"Jane Doe\nSkills: Rust, SQL").unwrap();

        let file = UploadedFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "jane_doe.txt");
        assert_eq!(file.size(), 26);
    }

    #[tokio::test]
    async fn test_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadedFile::from_path(&dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
