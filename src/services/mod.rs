pub mod completion;
pub mod heuristics;
pub mod pdf_processor;
pub mod pipeline;
pub mod postprocess;

pub use completion::{CompletionClient, GeminiClient};
pub use heuristics::{FieldMatcher, StatementMatchers};
pub use pdf_processor::{PdfProcessor, TextExtractor};
pub use pipeline::{ExtractionPipeline, STATEMENT_PROMPT};
pub use postprocess::{decode_completion, strip_code_fences};
