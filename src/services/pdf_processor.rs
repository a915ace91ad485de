use std::path::Path;
use std::time::Instant;

use lopdf::encryption::DecryptionError;
use lopdf::Document;

use crate::error::{AppError, AppResult};

/// Turns a (possibly encrypted) PDF on disk into plain text.
///
/// Implementations are blocking; callers run them off the async workers.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path, password: &str) -> AppResult<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    fn open(&self, path: &Path, password: &str) -> AppResult<Document> {
        // Decryption happens while loading, before object streams are parsed.
        let doc = Document::load_with_password(path, password).map_err(open_error)?;

        if doc.is_encrypted() {
            tracing::debug!(
                password_supplied = !password.is_empty(),
                "Encrypted PDF opened"
            );
        } else if !password.is_empty() {
            tracing::debug!("PDF is not encrypted, ignoring supplied password");
        }

        Ok(doc)
    }
}

fn open_error(err: lopdf::Error) -> AppError {
    match err {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
            AppError::decryption("invalid password")
        }
        lopdf::Error::Decryption(e) => {
            AppError::processing(format!("unsupported or malformed encryption: {}", e))
        }
        e => AppError::processing(format!("error opening PDF: {}", e)),
    }
}

impl TextExtractor for PdfProcessor {
    fn extract_text(&self, path: &Path, password: &str) -> AppResult<String> {
        let start = Instant::now();
        let doc = self.open(path, password)?;

        let pages = doc.get_pages();
        let mut text = String::new();
        let mut skipped = 0usize;

        for &page_number in pages.keys() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(page = page_number, error = %e, "Error extracting text from page");
                }
            }
        }

        tracing::info!(
            pages = pages.len(),
            skipped_pages = skipped,
            characters = text.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "PDF text extraction completed"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use lopdf::content::{Content, Operation};
    use lopdf::encryption::crypt_filters::{Aes128CryptFilter, CryptFilter};
    use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
    use lopdf::{dictionary, Object, Stream, StringFormat};

    fn write_statement(path: &Path, lines: &[&str]) {
        build_statement(lines).save(path).unwrap();
    }

    /// AES-128 (V4/R4) statement protected with `user_password`.
    fn write_encrypted_statement(path: &Path, lines: &[&str], user_password: &str) {
        let mut doc = build_statement(lines);
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(b"statement-file-id-0001".to_vec(), StringFormat::Literal),
                Object::String(b"statement-file-id-0001".to_vec(), StringFormat::Literal),
            ]),
        );

        let crypt_filter: Arc<dyn CryptFilter> = Arc::new(Aes128CryptFilter);
        let version = EncryptionVersion::V4 {
            document: &doc,
            encrypt_metadata: true,
            crypt_filters: BTreeMap::from([(b"StdCF".to_vec(), crypt_filter)]),
            stream_filter: b"StdCF".to_vec(),
            string_filter: b"StdCF".to_vec(),
            owner_password: "bank-owner-password",
            user_password,
            permissions: Permissions::all(),
        };
        let state = EncryptionState::try_from(version).unwrap();
        doc.encrypt(&state).unwrap();
        doc.save(path).unwrap();
    }

    fn build_statement(lines: &[&str]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
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
        doc
    }

    #[test]
    fn extracts_every_page_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.pdf");
        write_statement(&path, &["Total Amount Due 5342.00", "Payment Due Date 29 Dec 2024"]);

        let text = PdfProcessor::new().extract_text(&path, "").unwrap();

        let first = text.find("Total Amount Due").expect("first page text");
        let second = text.find("Payment Due Date").expect("second page text");
        assert!(first < second);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn password_is_ignored_for_unencrypted_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.pdf");
        write_statement(&path, &["Card ending 4321"]);

        let text = PdfProcessor::new().extract_text(&path, "secret").unwrap();
        assert!(text.contains("Card ending 4321"));
    }

    #[test]
    fn rejects_files_that_are_not_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfProcessor::new().extract_text(&path, "secret").unwrap_err();
        assert!(matches!(err, AppError::ProcessingError { .. }));
        assert!(err.to_string().contains("error opening PDF"));
    }

    #[test]
    fn missing_file_is_a_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfProcessor::new()
            .extract_text(&dir.path().join("absent.pdf"), "")
            .unwrap_err();
        assert!(matches!(err, AppError::ProcessingError { .. }));
    }

    #[test]
    fn decrypts_aes_statement_with_correct_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        write_encrypted_statement(&path, &["Total Amount Due 5342.00"], "JOHN1990");

        let text = PdfProcessor::new().extract_text(&path, "JOHN1990").unwrap();
        assert!(text.contains("Total Amount Due 5342.00"));
    }

    #[test]
    fn wrong_password_is_a_decryption_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        write_encrypted_statement(&path, &["Total Amount Due 5342.00"], "JOHN1990");

        let err = PdfProcessor::new().extract_text(&path, "wrong").unwrap_err();
        assert_eq!(err.error_code(), "DECRYPTION_ERROR");
        assert!(err.to_string().contains("invalid password"));
    }

    #[test]
    fn empty_password_is_tried_as_empty_user_password() {
        let dir = tempfile::tempdir().unwrap();

        let open = dir.path().join("open.pdf");
        write_encrypted_statement(&open, &["Card ending 4321"], "");
        let text = PdfProcessor::new().extract_text(&open, "").unwrap();
        assert!(text.contains("Card ending 4321"));

        let locked = dir.path().join("locked.pdf");
        write_encrypted_statement(&locked, &["Card ending 4321"], "JOHN1990");
        let err = PdfProcessor::new().extract_text(&locked, "").unwrap_err();
        assert_eq!(err.error_code(), "DECRYPTION_ERROR");
    }
}
