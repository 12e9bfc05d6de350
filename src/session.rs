use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated-session notion the store is scoped by. The actual
/// authentication backend is external; this only records who is signed
/// in, the way the original kept it in browser storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub logged_in_at: DateTime<Utc>,
}

fn session_path() -> PathBuf {
    let dir = std::env::var("INTERN_TRACKER_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".intern-tracker"));
    dir.join("session.json")
}

pub fn login(name: &str, email: &str) -> anyhow::Result<Session> {
    if name.trim().is_empty() {
        anyhow::bail!("please enter a name");
    }
    if email.trim().is_empty() {
        anyhow::bail!("please enter an email");
    }

    // Stable per email so a returning user sees their own persons.
    let user_id = Uuid::new_v5(&Uuid::NAMESPACE_OID, email.trim().to_lowercase().as_bytes());
    let session = Session {
        user_id,
        user_name: name.trim().to_string(),
        email: email.trim().to_string(),
        logged_in_at: Utc::now(),
    };

    let path = session_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&session)?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(%user_id, "logged in");
    Ok(session)
}

/// Remove the stored session; returns whether one existed.
pub fn logout() -> anyhow::Result<bool> {
    let path = session_path();
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

pub fn current() -> anyhow::Result<Option<Session>> {
    let path = session_path();
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let session = serde_json::from_str(&json)
        .with_context(|| format!("corrupt session file at {}", path.display()))?;
    Ok(Some(session))
}

pub fn require() -> anyhow::Result<Session> {
    current()?.context("not logged in; run `intern-tracker login` first")
}
