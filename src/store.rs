use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Intern, InternPatch, Person};

/// Failure from the persistence collaborator, carried as a message.
#[derive(Debug, thiserror::Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// The persistence seam: list/insert/update/delete per collection.
/// The dashboard only ever talks to this trait, never to a transport.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_persons(&self, user_id: Uuid) -> Result<Vec<Person>, StoreError>;
    async fn insert_person(&self, person: &Person) -> Result<(), StoreError>;
    async fn rename_person(&self, id: Uuid, name: &str) -> Result<(), StoreError>;
    /// Batch delete; intern records owned by these persons go with them.
    async fn delete_persons(&self, ids: &[Uuid]) -> Result<(), StoreError>;

    /// Interns for one person, ordered by display index.
    async fn list_interns(&self, person_id: Uuid) -> Result<Vec<Intern>, StoreError>;
    async fn insert_intern(&self, intern: &Intern) -> Result<(), StoreError>;
    /// Batch import: a single multi-row insert, not a client-side
    /// transaction.
    async fn insert_interns(&self, interns: &[Intern]) -> Result<(), StoreError>;
    async fn update_intern(&self, id: Uuid, patch: &InternPatch) -> Result<(), StoreError>;
    async fn delete_intern(&self, id: Uuid) -> Result<(), StoreError>;
}
