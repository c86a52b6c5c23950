//! Bearer token store in `~/.finorg/auth.json`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use finorg_client::ApiClient;

use crate::state::ensure_finorg_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Session {
    /// API root the token was issued by
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
}

impl Session {
    /// Token to send to `base_url`, if this session was opened against it.
    pub fn token_for(&self, base_url: &str) -> Option<&str> {
        match &self.base_url {
            Some(issuer) if issuer.trim_end_matches('/') != base_url.trim_end_matches('/') => None,
            _ => self.access_token.as_deref(),
        }
    }
}

fn session_path() -> Result<PathBuf> {
    Ok(ensure_finorg_home()?.join("auth.json"))
}

pub fn load_session() -> Result<Session> {
    let p = session_path()?;
    if !p.exists() {
        return Ok(Session::default());
    }
    let raw = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", p.display()))
}

fn store_session(session: &Session) -> Result<()> {
    let p = session_path()?;
    let raw = serde_json::to_string_pretty(session)?;
    fs::write(&p, raw).with_context(|| format!("write {}", p.display()))
}

pub async fn login(client: &mut ApiClient, email: &str) -> Result<()> {
    let password = rpassword::prompt_password(format!("Password for {email}: "))
        .context("read password")?;
    if password.is_empty() {
        bail!("password is required");
    }
    let token = client.login(email, &password).await?;
    store_session(&Session {
        base_url: Some(client.base_url().to_string()),
        email: Some(email.to_string()),
        access_token: Some(token.access_token),
    })?;
    println!("Logged in as {email}");
    Ok(())
}

pub fn logout() -> Result<()> {
    let session = load_session()?;
    store_session(&Session::default())?;
    match session.email {
        Some(email) => println!("Logged out {email}"),
        None => println!("No stored session"),
    }
    Ok(())
}
