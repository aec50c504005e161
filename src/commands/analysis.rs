//! Document-analysis commands.
//!
//! One session at a time: analyzing a new PDF replaces the previous
//! session and its transcript.

use crate::analysis::{render_markup, AnalysisSession, ChatMessage, GeminiClient, MessageRole};
use crate::credentials::CredentialManager;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tauri::State;
use tokio::sync::Mutex;

pub struct AnalysisState {
    session: Mutex<Option<AnalysisSession>>,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub role: MessageRole,
    pub content: String,
    pub content_html: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub page_count: usize,
    pub messages: Vec<TranscriptMessage>,
}

fn transcript(messages: &[ChatMessage]) -> Vec<TranscriptMessage> {
    messages
        .iter()
        .map(|m| TranscriptMessage {
            role: m.role,
            content: m.content.clone(),
            content_html: render_markup(&m.content),
            timestamp: m.timestamp,
        })
        .collect()
}

fn gemini_client() -> Result<GeminiClient, String> {
    let api_key = CredentialManager::get_api_key("gemini")?;
    Ok(GeminiClient::new(api_key)?)
}

/// Load a PDF from disk, extract its text, and run the checklist
/// verification. Returns the fresh transcript.
#[tauri::command]
pub async fn analyze_document(
    path: String,
    state: State<'_, AnalysisState>,
) -> Result<AnalysisResult, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Gagal membaca file {}: {}", path, e))?;

    let mut session = AnalysisSession::load(&bytes)?;
    let model = gemini_client()?;
    session.analyze(&model).await;

    let result = AnalysisResult {
        page_count: session.page_count(),
        messages: transcript(session.messages()),
    };
    *state.session.lock().await = Some(session);
    Ok(result)
}

/// Ask a follow-up question about the loaded document.
#[tauri::command]
pub async fn ask_document_question(
    question: String,
    state: State<'_, AnalysisState>,
) -> Result<Vec<TranscriptMessage>, String> {
    let mut guard = state.session.lock().await;
    let session = guard
        .as_mut()
        .ok_or("No document loaded. Call analyze_document first.")?;

    let model = gemini_client()?;
    session.ask(&model, &question).await;
    Ok(transcript(session.messages()))
}

#[tauri::command]
pub async fn get_analysis_transcript(
    state: State<'_, AnalysisState>,
) -> Result<Vec<TranscriptMessage>, String> {
    let guard = state.session.lock().await;
    Ok(guard
        .as_ref()
        .map(|s| transcript(s.messages()))
        .unwrap_or_default())
}
