//! # Hosted Backend Client
//!
//! Talks to a Supabase project over its REST surface:
//!
//! - `auth/v1` for sign-up, password sign-in, sign-out and session lookup
//! - `storage/v1/object/<bucket>` for image uploads and public URLs
//! - `rest/v1/<table>` for page rows, upserted on the `slug` conflict key
//!
//! Every request carries the project key as `apikey`. Non-success responses
//! are mapped onto the matching [`BackendError`] variant with the response
//! body as the message.

use crate::service::{AuthService, Credentials, DocumentStore, ObjectStore, Session, SignUp, StoredPage};
use crate::BackendError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub bucket: String,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    client: Client,
    config: SupabaseConfig,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    user: UserBody,
}

#[derive(Debug, Deserialize)]
struct SlugRow {
    slug: String,
}

impl SupabaseBackend {
    pub fn new(mut config: SupabaseConfig) -> Self {
        config.url = config.url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.key)
            .header("Authorization", format!("Bearer {}", self.config.key))
    }

    fn session_from(token: TokenBody, fallback_email: &str) -> Session {
        Session {
            access_token: token.access_token,
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| fallback_email.to_string()),
        }
    }
}

/// Best-effort error text from a failed response
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or(body);
    format!("{} {}", status.as_u16(), detail)
}

#[async_trait]
impl AuthService for SupabaseBackend {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, BackendError> {
        let response = self
            .request(self.client.post(self.endpoint("auth/v1/signup")))
            .json(credentials)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::AuthFailure(error_message(response).await));
        }

        // With email confirmation on, the body is the bare user; otherwise a
        // full token response.
        let body: Value = response.json().await?;
        if body.get("access_token").is_some() {
            let token: TokenBody = serde_json::from_value(body)?;
            let user_id = token.user.id.clone();
            return Ok(SignUp {
                user_id: Some(user_id),
                session: Some(Self::session_from(token, &credentials.email)),
            });
        }
        let user_id = body
            .get("id")
            .or_else(|| body.get("user").and_then(|u| u.get("id")))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(SignUp {
            user_id,
            session: None,
        })
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        let response = self
            .request(self.client.post(self.endpoint("auth/v1/token")))
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::AuthFailure(error_message(response).await));
        }
        let token: TokenBody = response.json().await?;
        Ok(Self::session_from(token, &credentials.email))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("auth/v1/logout"))
            .header("apikey", &self.config.key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() && response.status() != StatusCode::UNAUTHORIZED {
            return Err(BackendError::Transport(error_message(response).await));
        }
        Ok(())
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, BackendError> {
        let response = self
            .client
            .get(self.endpoint("auth/v1/user"))
            .header("apikey", &self.config.key)
            .bearer_auth(access_token)
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let user: UserBody = response.json().await?;
                Ok(Some(Session {
                    access_token: access_token.to_string(),
                    user_id: user.id,
                    email: user.email.unwrap_or_default(),
                }))
            }
            _ => Err(BackendError::Transport(error_message(response).await)),
        }
    }
}

#[async_trait]
impl ObjectStore for SupabaseBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", self.config.bucket, path));
        let response = self
            .request(self.client.post(url))
            .header("Content-Type", content_type.unwrap_or("application/octet-stream"))
            .body(bytes)
            .send()
            .await
            .map_err(|e| BackendError::UploadFailure(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BackendError::UploadFailure(error_message(response).await));
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.endpoint(&format!("storage/v1/object/public/{}/{}", self.config.bucket, path))
    }
}

#[async_trait]
impl DocumentStore for SupabaseBackend {
    async fn select(&self, slug: &str) -> Result<Option<StoredPage>, BackendError> {
        let response = self
            .request(self.client.get(self.endpoint(&format!("rest/v1/{}", self.config.table))))
            .query(&[
                ("slug", format!("eq.{}", slug)),
                ("select", "slug,title,content,updated_at".to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Transport(error_message(response).await));
        }
        let rows: Vec<StoredPage> = response.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert(&self, page: StoredPage) -> Result<(), BackendError> {
        let response = self
            .request(self.client.post(self.endpoint(&format!("rest/v1/{}", self.config.table))))
            .query(&[("on_conflict", "slug")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!([page]))
            .send()
            .await
            .map_err(|e| BackendError::SaveFailure(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BackendError::SaveFailure(error_message(response).await));
        }
        Ok(())
    }

    async fn list_slugs(&self) -> Result<Vec<String>, BackendError> {
        let response = self
            .request(self.client.get(self.endpoint(&format!("rest/v1/{}", self.config.table))))
            .query(&[("select", "slug")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Transport(error_message(response).await));
        }
        let rows: Vec<SlugRow> = response.json().await?;
        Ok(rows.into_iter().map(|row| row.slug).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new(SupabaseConfig {
            url: "https://project.supabase.co/".into(),
            key: "anon".into(),
            bucket: "images".into(),
            table: "pages".into(),
        })
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            backend().public_url("abc.png"),
            "https://project.supabase.co/storage/v1/object/public/images/abc.png"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            backend().endpoint("auth/v1/signup"),
            "https://project.supabase.co/auth/v1/signup"
        );
    }
}
