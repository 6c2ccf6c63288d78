use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::SyllabusFile;

const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
enum PdfError {
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decode failed: {0}")]
    Decode(#[from] pdf_extract::OutputError),
}

/// The "file fetch + binary-to-text decode" capability consumed by the
/// ingestion pipeline. Always returns text; failures are internal.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file: &SyllabusFile) -> String;
}

/// Fetches a remote PDF and decodes it to plain text. Non-PDF files and any
/// retrieval or decode failure yield an empty string, so a malformed or
/// unreachable syllabus can never fail course creation.
pub struct PdfTextExtractor {
    client: Client,
}

impl PdfTextExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_and_decode(&self, url: &str) -> Result<String, PdfError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let text = pdf_extract::extract_text_from_mem(&bytes)?;
        Ok(text)
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, file: &SyllabusFile) -> String {
        // Many courses have no PDF syllabus at all; skipping is not an error.
        if file.mime_type != PDF_MIME_TYPE {
            debug!(mime_type = %file.mime_type, "file is not a PDF, skipping text extraction");
            return String::new();
        }

        match self.fetch_and_decode(&file.url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %file.url, error = %e, "failed to extract text from PDF");
                String::new()
            }
        }
    }
}
