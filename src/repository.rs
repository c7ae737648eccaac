use crate::errors::RemoteError;
use crate::models::{NewScore, ScoreFields, ScoreRecord};
use crate::remote::{Backend, CREATED_AT, Query};
use std::sync::Arc;
use tracing::info;

/// Fixed page size; each user logs at most 30 records, two users share the collection.
pub const FETCH_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned {
    pub mine: Vec<ScoreRecord>,
    pub friend: Vec<ScoreRecord>,
}

/// Splits records by owner, keeping the fetched order in each half.
pub fn partition(records: Vec<ScoreRecord>, owner_id: &str) -> Partitioned {
    let (mine, friend) = records.into_iter().partition(|r| r.owner_id == owner_id);
    Partitioned { mine, friend }
}

pub struct ScoreRepository {
    backend: Arc<dyn Backend>,
}

impl ScoreRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Most recent first, at most [`FETCH_LIMIT`] records.
    pub async fn fetch_all(&self) -> Result<Vec<ScoreRecord>, RemoteError> {
        self.backend
            .list_documents(&[Query::OrderDesc(CREATED_AT), Query::Limit(FETCH_LIMIT)])
            .await
    }

    pub async fn create(&self, owner_id: &str, fields: ScoreFields, day: u32) -> Result<ScoreRecord, RemoteError> {
        let record = self
            .backend
            .create_document(&NewScore {
                owner_id: owner_id.to_string(),
                fields,
                day,
            })
            .await?;
        info!(id = %record.id, day, "score created");
        Ok(record)
    }

    pub async fn update(&self, id: &str, fields: ScoreFields) -> Result<ScoreRecord, RemoteError> {
        let record = self.backend.update_document(id, &fields).await?;
        info!(id = %record.id, "score updated");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityTable;
    use crate::memory::MemoryBackend;

    const FIELDS: ScoreFields = ScoreFields {
        listening: 30,
        reading: 31,
        writing: 6.5,
    };

    async fn signed_in() -> ScoreRepository {
        let table = IdentityTable::parse("a=a@x.io,b=b@x.io", "pw").unwrap();
        let backend = MemoryBackend::new(&table);
        backend.create_session("a@x.io", "pw").await.unwrap();
        ScoreRepository::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn created_record_is_partitioned_as_mine() {
        let repo = signed_in().await;
        repo.create("user-b", FIELDS, 1).await.unwrap();
        let created = repo.create("user-a", FIELDS, 1).await.unwrap();

        let split = partition(repo.fetch_all().await.unwrap(), "user-a");
        assert_eq!(split.mine, vec![created]);
        assert_eq!(split.friend.len(), 1);
        assert_eq!(split.friend[0].owner_id, "user-b");
    }

    #[tokio::test]
    async fn fetch_is_newest_first_and_capped() {
        let repo = signed_in().await;
        for day in 1..=(FETCH_LIMIT as u32 + 5) {
            repo.create("user-a", FIELDS, day).await.unwrap();
        }

        let records = repo.fetch_all().await.unwrap();
        assert_eq!(records.len(), FETCH_LIMIT);
        assert_eq!(records[0].day, FETCH_LIMIT as u32 + 5);
        assert!(records.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[tokio::test]
    async fn update_rewrites_scores_but_keeps_day() {
        let repo = signed_in().await;
        let created = repo.create("user-a", FIELDS, 7).await.unwrap();
        let fields = ScoreFields {
            listening: 12,
            reading: 13,
            writing: 0.0,
        };

        let updated = repo.update(&created.id, fields).await.unwrap();
        assert_eq!(updated.listening, 12);
        assert_eq!(updated.writing, 0.0);
        assert_eq!(updated.day, 7);
        assert_eq!(updated.created_at, created.created_at);
    }
}
