use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::error::AppResult;
use crate::services::completion::CompletionClient;
use crate::services::pdf_processor::TextExtractor;

pub const STATEMENT_PROMPT: &str = r#"You are an expert financial document parser.

Your task is to analyze the following credit card statement text and extract key structured information.
The text may contain formatting artifacts, OCR errors, or unusual spacing; be flexible and infer meaning from context.

Return your answer strictly as a JSON object with these fields:

{
  "card_last_4": "string | null",
  "card_variant": "string | null",
  "billing_cycle": "string | null",
  "payment_due_date": "string | null",
  "total_due_amount": "string | null",
  "transactions": [
    {
      "date": "string | null",
      "description": "string | null",
      "amount": "string | null"
    }
  ] | null
}

Guidelines:
- Extract only the **last four digits** of the card number.
- The **card variant** is typically like "SBI Card PRIME", "HDFC Regalia", "Axis Flipkart Card", etc.
- **Billing cycle** or statement period may appear as "Billing Cycle: 12 Dec 2024 10 Jan 2025".
- **Payment due date** might appear as "Payment Due Date: 29 Dec 2024" or similar; extract the full date as a string.
- **Total due amount** or "Total Amount Due" should be captured as a number string, e.g. "₹5,342.00".
- For **transactions**, extract each transaction's date, description, and amount. Dates may be in formats like "12/12", "12-Dec", etc.
- If a field is not found, return null for that field.
- Do not include any commentary or explanations outside the JSON.

Now analyze this statement text and return the structured data."#;

/// Statement text extraction followed by a completion call.
#[derive(Clone)]
pub struct ExtractionPipeline {
    extractor: Arc<dyn TextExtractor>,
    completion: Arc<dyn CompletionClient>,
}

impl ExtractionPipeline {
    pub fn new(extractor: Arc<dyn TextExtractor>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            extractor,
            completion,
        }
    }

    pub fn build_prompt(&self, statement_text: &str) -> String {
        format!("{}\n\n{}", STATEMENT_PROMPT, statement_text)
    }

    /// Decrypts and extracts the document on the blocking pool.
    pub async fn extract_text(&self, path: &Path, password: &str) -> AppResult<String> {
        let extractor = Arc::clone(&self.extractor);
        let path: PathBuf = path.to_path_buf();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || extractor.extract_text(&path, &password)).await?
    }

    /// Runs the full pipeline and returns the raw completion text.
    pub async fn run(&self, path: &Path, password: &str) -> AppResult<String> {
        let text = self.extract_text(path, password).await?;

        let start = Instant::now();
        let result = self.completion.complete(&self.build_prompt(&text)).await?;
        tracing::info!(
            input_chars = text.len(),
            output_chars = result.len(),
            completion_time_ms = start.elapsed().as_millis() as u64,
            "Statement analysis completed"
        );

        Ok(result)
    }
}
