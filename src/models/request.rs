use std::path::Path;

use bytes::Bytes;

/// A statement upload as received from the multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub password: String,
    pub content: Bytes,
}

impl Upload {
    pub fn new(file_name: String, password: String, content: Bytes) -> Self {
        Self {
            file_name,
            password,
            content,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn has_pdf_extension(&self) -> bool {
        has_pdf_extension(&self.file_name)
    }

    /// Final path component of the client-supplied name, safe to embed in a
    /// temp-file name.
    pub fn safe_name(&self) -> String {
        safe_file_name(&self.file_name)
    }
}

pub fn has_pdf_extension(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".pdf")
}

pub fn safe_file_name(file_name: &str) -> String {
    // Clients on Windows send backslash separators.
    let last = file_name.rsplit(['/', '\\']).next().unwrap_or("");
    let base = Path::new(last)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    if base.is_empty() {
        "upload.pdf".to_string()
    } else {
        base.to_string()
    }
}
