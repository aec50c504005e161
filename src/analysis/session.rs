//! Per-document analysis session.
//!
//! Holds the page texts extracted from one PDF and the append-only
//! transcript of the conversation about it.

use super::gemini::TextGenerator;
use super::prompt::{checklist_prompt, followup_prompt, page_check};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;

const ANALYZE_ERROR: &str =
    "Maaf, terjadi kesalahan saat menganalisis dokumen. Silakan coba upload ulang.";
const ASK_ERROR: &str = "Maaf, terjadi kesalahan saat memproses pertanyaan Anda. Silakan coba lagi.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

pub struct AnalysisSession {
    pages: Vec<String>,
    messages: Vec<ChatMessage>,
}

impl AnalysisSession {
    /// Extract per-page text from a PDF and start an empty transcript.
    pub fn load(bytes: &[u8]) -> Result<Self, AppError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| AppError::Document(format!("Gagal membaca PDF: {}", e)))?;
        Ok(Self::from_pages(pages))
    }

    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            pages,
            messages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn full_text(&self) -> String {
        self.pages.join("\n")
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Run the checklist verification over the whole document. Model
    /// failures become an apology message in the transcript rather than an
    /// error.
    pub async fn analyze(&mut self, model: &dyn TextGenerator) -> &ChatMessage {
        let prompt = checklist_prompt(&self.full_text());
        let content = match model.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("[Analysis] Document verification failed: {}", e);
                ANALYZE_ERROR.to_string()
            }
        };
        self.push(MessageRole::Ai, content)
    }

    /// Answer a follow-up question about the loaded document. The page
    /// check is recomputed locally so the model cannot drift on it.
    pub async fn ask(&mut self, model: &dyn TextGenerator, question: &str) -> &ChatMessage {
        self.push(MessageRole::User, question.to_string());

        let prompt = followup_prompt(&self.full_text(), &page_check(&self.pages), question);
        let content = match model.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("[Analysis] Question failed: {}", e);
                ASK_ERROR.to_string()
            }
        };
        self.push(MessageRole::Ai, content)
    }

    fn push(&mut self, role: MessageRole, content: String) -> &ChatMessage {
        self.messages.push(ChatMessage {
            role,
            content,
            timestamp: Utc::now(),
        });
        self.messages.last().unwrap()
    }
}
