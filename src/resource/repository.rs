//! # Resource Repository
//!
//! Generic CRUD over one collection in a [`RecordStore`].
//!
//! Every operation loads the whole collection. Mutations run as a full
//! load-mutate-save cycle under the store's per-collection lock, so two
//! concurrent updates to the same collection cannot lose each other's
//! changes within this process. Reads take no lock.
//!
//! Validation runs on `create` only. Updates are merged without re-checking
//! the policy.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use super::filter::RecordFilter;
use crate::record::{merge_fields, Payload, Record};
use crate::store::RecordStore;
use crate::validation::ValidationPolicy;

/// CRUD operations for one resource type
#[derive(Debug, Clone)]
pub struct ResourceRepository {
    resource: String,
    label: String,
    store: Arc<RecordStore>,
    policy: ValidationPolicy,
}

impl ResourceRepository {
    /// Create a repository for the collection named `resource`.
    ///
    /// `label` names a single record in error messages ("Book").
    pub fn new(
        resource: impl Into<String>,
        label: impl Into<String>,
        store: Arc<RecordStore>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            resource: resource.into(),
            label: label.into(),
            store,
            policy,
        }
    }

    /// Repository for the `books` collection
    pub fn books(store: Arc<RecordStore>) -> Self {
        Self::new("books", "Book", store, ValidationPolicy::books())
    }

    /// Repository for the `users` collection
    pub fn users(store: Arc<RecordStore>) -> Self {
        Self::new("users", "User", store, ValidationPolicy::users())
    }

    /// Validate and append a new record, returning its id
    pub async fn create(&self, payload: Payload) -> RepositoryResult<String> {
        let errors = self.policy.check(&payload);
        if !errors.is_empty() {
            return Err(RepositoryError::ValidationFailed { errors });
        }

        let id = Uuid::new_v4().to_string();
        let record = Record::create(payload, id.clone(), Utc::now());

        let _guard = self.store.lock(&self.resource).await;
        let mut collection = self.store.load(&self.resource).await?;
        collection.push(record);
        self.store.save(&self.resource, &collection).await?;

        info!(resource = %self.resource, %id, "record created");
        Ok(id)
    }

    /// All records, or those matching `filter`, in stored order
    pub async fn list(&self, filter: Option<&RecordFilter>) -> RepositoryResult<Vec<Record>> {
        let collection = self.store.load(&self.resource).await?;

        Ok(match filter {
            Some(filter) => collection
                .into_iter()
                .filter(|record| filter.matches(record))
                .collect(),
            None => collection,
        })
    }

    /// Fetch one record
    pub async fn get_by_id(&self, id: &str) -> RepositoryResult<Record> {
        self.store
            .load(&self.resource)
            .await?
            .into_iter()
            .find(|record| record.has_id(id))
            .ok_or_else(|| RepositoryError::not_found(&self.label, id))
    }

    /// Merge `payload` into an existing record and stamp `updatedAt`
    pub async fn replace_by_id(&self, id: &str, payload: Payload) -> RepositoryResult<Record> {
        let _guard = self.store.lock(&self.resource).await;
        let mut collection = self.store.load(&self.resource).await?;

        let index = collection
            .iter()
            .position(|record| record.has_id(id))
            .ok_or_else(|| RepositoryError::not_found(&self.label, id))?;

        let mut updated = merge_fields(&collection[index], &payload);
        updated.touch(Utc::now());
        collection[index] = updated.clone();

        self.store.save(&self.resource, &collection).await?;

        info!(resource = %self.resource, %id, "record updated");
        Ok(updated)
    }

    /// Remove a record; removing an unknown id is not an error
    pub async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        let _guard = self.store.lock(&self.resource).await;
        let mut collection = self.store.load(&self.resource).await?;

        let before = collection.len();
        collection.retain(|record| !record.has_id(id));
        self.store.save(&self.resource, &collection).await?;

        info!(
            resource = %self.resource,
            %id,
            removed = before - collection.len(),
            "record deleted"
        );
        Ok(())
    }
}
