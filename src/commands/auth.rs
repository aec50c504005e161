//! Login command for the webview's sign-in form.

use super::AppState;
use serde::Serialize;
use tauri::State;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user_id: String,
    pub access_token: String,
}

#[tauri::command]
pub async fn login(
    email: String,
    password: String,
    state: State<'_, AppState>,
) -> Result<LoginResult, String> {
    let session = state.client.sign_in_with_password(&email, &password).await?;
    tracing::info!("[Auth] {} signed in", email);
    Ok(LoginResult {
        user_id: session.user_id,
        access_token: session.access_token,
    })
}
