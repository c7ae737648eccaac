use crate::config::AppwriteSettings;
use crate::errors::RemoteError;
use crate::models::{Identity, NewScore, ScoreFields, ScoreRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

pub const CREATED_AT: &str = "$createdAt";

/// Query modifiers understood by the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    OrderDesc(&'static str),
    Limit(usize),
}

impl Query {
    fn to_wire(&self) -> String {
        match self {
            Self::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
            Self::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
        }
        .to_string()
    }
}

/// Hosted authentication and document store. The collection is fixed per backend.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn create_session(&self, email: &str, password: &str) -> Result<(), RemoteError>;
    async fn current_identity(&self) -> Result<Option<Identity>, RemoteError>;
    async fn delete_session(&self) -> Result<(), RemoteError>;
    async fn list_documents(&self, queries: &[Query]) -> Result<Vec<ScoreRecord>, RemoteError>;
    async fn create_document(&self, score: &NewScore) -> Result<ScoreRecord, RemoteError>;
    async fn update_document(&self, id: &str, fields: &ScoreFields) -> Result<ScoreRecord, RemoteError>;
}

pub struct AppwriteBackend {
    client: Client,
    settings: AppwriteSettings,
}

impl AppwriteBackend {
    pub fn new(settings: AppwriteSettings) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.endpoint.trim_end_matches('/'))
    }

    fn documents_url(&self) -> String {
        self.url(&format!(
            "/databases/{}/collections/{}/documents",
            self.settings.database_id, self.settings.collection_id
        ))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("X-Appwrite-Project", &self.settings.project_id)
    }
}

#[async_trait]
impl Backend for AppwriteBackend {
    #[instrument(skip(self, password))]
    async fn create_session(&self, email: &str, password: &str) -> Result<(), RemoteError> {
        let response = self
            .request(self.client.post(self.url("/account/sessions/email")))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, RemoteError> {
        let response = self.request(self.client.get(self.url("/account"))).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let account: AccountWire = check(response).await?.json().await?;
        Ok(Some(Identity {
            id: account.id,
            name: account.name,
            email: account.email,
        }))
    }

    async fn delete_session(&self) -> Result<(), RemoteError> {
        let response = self
            .request(self.client.delete(self.url("/account/sessions/current")))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn list_documents(&self, queries: &[Query]) -> Result<Vec<ScoreRecord>, RemoteError> {
        let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.to_wire())).collect();
        let response = self
            .request(self.client.get(self.documents_url()))
            .query(&params)
            .send()
            .await?;
        let list: DocumentListWire = check(response).await?.json().await?;
        debug!(total = list.total, returned = list.documents.len(), "listed documents");
        Ok(list.documents.into_iter().map(ScoreRecord::from).collect())
    }

    async fn create_document(&self, score: &NewScore) -> Result<ScoreRecord, RemoteError> {
        let body = json!({
            "documentId": "unique()",
            "data": {
                "userId": score.owner_id,
                "listening": score.fields.listening,
                "reading": score.fields.reading,
                "writing": score.fields.writing,
                "day": score.day,
            }
        });
        let response = self
            .request(self.client.post(self.documents_url()))
            .json(&body)
            .send()
            .await?;
        let document: DocumentWire = check(response).await?.json().await?;
        Ok(document.into())
    }

    async fn update_document(&self, id: &str, fields: &ScoreFields) -> Result<ScoreRecord, RemoteError> {
        let response = self
            .request(self.client.patch(format!("{}/{id}", self.documents_url())))
            .json(&json!({ "data": fields }))
            .send()
            .await?;
        let document: DocumentWire = check(response).await?.json().await?;
        Ok(document.into())
    }
}

async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ErrorWire>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountWire {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct DocumentListWire {
    #[serde(default)]
    total: u64,
    documents: Vec<DocumentWire>,
}

#[derive(Debug, Deserialize)]
struct DocumentWire {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "$createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    user_id: String,
    listening: u8,
    reading: u8,
    #[serde(default)]
    writing: Option<f64>,
    #[serde(default)]
    day: Option<u32>,
}

impl From<DocumentWire> for ScoreRecord {
    fn from(doc: DocumentWire) -> Self {
        Self {
            id: doc.id,
            owner_id: doc.user_id,
            created_at: doc.created_at,
            listening: doc.listening,
            reading: doc.reading,
            writing: doc.writing.unwrap_or(0.0),
            day: doc.day.unwrap_or(0),
        }
    }
}
