//! Claim-document analysis panel.
//!
//! A PDF is loaded once, its text extracted per page, and a Gemini model
//! checks the pages against the BPJS document checklist. Follow-up
//! questions run against the same extracted text; every exchange is
//! appended to the session transcript.

mod gemini;
mod prompt;
mod session;

pub use gemini::{GeminiClient, TextGenerator};
pub use prompt::{checklist_prompt, followup_prompt, page_check, render_markup};
pub use session::{AnalysisSession, ChatMessage, MessageRole};
