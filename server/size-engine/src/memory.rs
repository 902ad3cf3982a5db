//! In-memory `RecordStore`. Each operation runs under one lock acquisition.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::RecordStore;
use crate::types::{CommitRecord, CommitRecordPayload, Review, ScopeQuery};

#[derive(Default)]
struct Inner {
  records: Vec<CommitRecord>,
  project_last_record: HashMap<String, DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryRecordStore {
  inner: Mutex<Inner>,
}

impl MemoryRecordStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn len(&self) -> usize {
    self.lock().records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn project_last_record(&self, project_id: &str) -> Option<DateTime<Utc>> {
    self.lock().project_last_record.get(project_id).copied()
  }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
  async fn upsert_by_identity(
    &self,
    project_id: &str,
    payload: &CommitRecordPayload,
    creation_date: DateTime<Utc>,
  ) -> Result<CommitRecord, StoreError> {
    let mut inner = self.lock();

    let position = inner.records.iter().position(|r| {
      r.project_id == project_id
        && r.sub_project == payload.sub_project
        && r.commit_sha == payload.commit_sha
    });

    let record = match position {
      Some(i) => {
        let slot = &mut inner.records[i];
        let mut replaced = CommitRecord::from_payload(slot.id, project_id, payload, creation_date);
        replaced.reviews = std::mem::take(&mut slot.reviews);
        *slot = replaced.clone();
        replaced
      }
      None => {
        let record = CommitRecord::from_payload(Uuid::new_v4(), project_id, payload, creation_date);
        inner.records.push(record.clone());
        record
      }
    };
    Ok(record)
  }

  async fn find_by_id(&self, project_id: &str, id: Uuid) -> Result<Option<CommitRecord>, StoreError> {
    let inner = self.lock();
    Ok(
      inner
        .records
        .iter()
        .find(|r| r.id == id && r.project_id == project_id)
        .cloned(),
    )
  }

  async fn query_by_scope(&self, project_id: &str, query: &ScopeQuery) -> Result<Vec<CommitRecord>, StoreError> {
    let inner = self.lock();
    let mut found: Vec<CommitRecord> = inner
      .records
      .iter()
      .filter(|r| {
        r.project_id == project_id
          && r.sub_project == query.sub_project
          && r.branch == query.branch
          && query.older_than.map_or(true, |ts| r.creation_date < ts)
      })
      .cloned()
      .collect();

    found.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
    found.truncate(query.limit);
    Ok(found)
  }

  async fn distinct_sub_projects(&self, project_id: &str) -> Result<Vec<String>, StoreError> {
    let inner = self.lock();
    let names: BTreeSet<String> = inner
      .records
      .iter()
      .filter(|r| r.project_id == project_id)
      .filter_map(|r| r.sub_project.clone())
      .collect();
    Ok(names.into_iter().collect())
  }

  async fn append_review(&self, project_id: &str, record_id: Uuid, review: &Review) -> Result<CommitRecord, StoreError> {
    let mut inner = self.lock();
    let record = inner
      .records
      .iter_mut()
      .find(|r| r.id == record_id && r.project_id == project_id)
      .ok_or_else(|| StoreError::not_found("commit record", record_id))?;
    record.reviews.push(review.clone());
    Ok(record.clone())
  }

  async fn touch_project(&self, project_id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
    self.lock().project_last_record.insert(project_id.to_string(), at);
    Ok(())
  }
}
