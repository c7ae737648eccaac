use crate::config::IdentityTable;
use crate::errors::RemoteError;
use crate::models::{Identity, NewScore, ScoreFields, ScoreRecord};
use crate::remote::{Backend, CREATED_AT, Query};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

struct Account {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct Inner {
    session: Option<Identity>,
    documents: Vec<ScoreRecord>,
    next_id: u64,
}

/// In-process stand-in for the hosted backend, provisioned from the identity table.
pub struct MemoryBackend {
    accounts: Vec<Account>,
    inner: Mutex<Inner>,
    pub session_calls: AtomicU64,
    pub list_calls: AtomicU64,
    pub write_calls: AtomicU64,
    fail_delete_session: bool,
}

impl MemoryBackend {
    pub fn new(identities: &IdentityTable) -> Self {
        let accounts = identities
            .credentials()
            .iter()
            .map(|c| Account {
                identity: Identity {
                    id: format!("user-{}", c.token),
                    name: c.display_name.clone(),
                    email: c.email.clone(),
                },
                password: identities.password().to_string(),
            })
            .collect();
        Self {
            accounts,
            inner: Mutex::new(Inner::default()),
            session_calls: AtomicU64::new(0),
            list_calls: AtomicU64::new(0),
            write_calls: AtomicU64::new(0),
            fail_delete_session: false,
        }
    }

    /// Makes `delete_session` fail after dropping the session, like a lost response.
    pub fn with_failing_logout(mut self) -> Self {
        self.fail_delete_session = true;
        self
    }

    pub async fn document_count(&self) -> usize {
        self.inner.lock().await.documents.len()
    }

    fn unauthorized() -> RemoteError {
        RemoteError::Rejected {
            status: 401,
            message: "User (role: guests) missing scope (account)".to_string(),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_session(&self, email: &str, password: &str) -> Result<(), RemoteError> {
        self.session_calls.fetch_add(1, Ordering::Relaxed);
        let account = self
            .accounts
            .iter()
            .find(|a| a.identity.email == email && a.password == password)
            .ok_or_else(|| RemoteError::Rejected {
                status: 401,
                message: "Invalid credentials. Please check the email and password.".to_string(),
            })?;
        self.inner.lock().await.session = Some(account.identity.clone());
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, RemoteError> {
        Ok(self.inner.lock().await.session.clone())
    }

    async fn delete_session(&self) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().await;
        if inner.session.take().is_none() {
            return Err(Self::unauthorized());
        }
        if self.fail_delete_session {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        Ok(())
    }

    async fn list_documents(&self, queries: &[Query]) -> Result<Vec<ScoreRecord>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.lock().await;
        if inner.session.is_none() {
            return Err(Self::unauthorized());
        }

        let mut documents = inner.documents.clone();
        let mut limit = None;
        for query in queries {
            match query {
                Query::OrderDesc(CREATED_AT) => {
                    documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                }
                Query::OrderDesc(other) => {
                    return Err(RemoteError::Rejected {
                        status: 400,
                        message: format!("Attribute not found in schema: {other}"),
                    });
                }
                Query::Limit(n) => limit = Some(*n),
            }
        }
        if let Some(n) = limit {
            documents.truncate(n);
        }
        Ok(documents)
    }

    async fn create_document(&self, score: &NewScore) -> Result<ScoreRecord, RemoteError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock().await;
        if inner.session.is_none() {
            return Err(Self::unauthorized());
        }

        // Keep creation times strictly increasing so ordering is deterministic.
        let now = Utc::now();
        let created_at = match inner.documents.last() {
            Some(last) if last.created_at >= now => last.created_at + Duration::milliseconds(1),
            _ => now,
        };
        inner.next_id += 1;
        let record = ScoreRecord {
            id: format!("doc-{}", inner.next_id),
            owner_id: score.owner_id.clone(),
            created_at,
            listening: score.fields.listening,
            reading: score.fields.reading,
            writing: score.fields.writing,
            day: score.day,
        };
        inner.documents.push(record.clone());
        Ok(record)
    }

    async fn update_document(&self, id: &str, fields: &ScoreFields) -> Result<ScoreRecord, RemoteError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock().await;
        let Some(caller) = inner.session.as_ref().map(|s| s.id.clone()) else {
            return Err(Self::unauthorized());
        };
        let document = inner
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| RemoteError::Rejected {
                status: 404,
                message: "Document with the requested ID could not be found.".to_string(),
            })?;
        if document.owner_id != caller {
            return Err(RemoteError::Rejected {
                status: 401,
                message: "The current user is not authorized to perform the requested action."
                    .to_string(),
            });
        }
        document.listening = fields.listening;
        document.reading = fields.reading;
        document.writing = fields.writing;
        Ok(document.clone())
    }
}
