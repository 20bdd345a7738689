//! InMemoryJobStore - 開発・テスト用の正本
//!
//! `RwLock<HashMap<JobId, Job>>` で Job を保持します。
//! 1 プロセス内で完結するため、save 後の load は必ず保存内容を観測します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Job, JobId};
use crate::ports::{JobStore, StoreError};

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id()) {
            return Err(StoreError::AlreadyExists(job.id()));
        }
        jobs.insert(job.id(), job.clone());
        Ok(())
    }

    async fn load(&self, id: JobId) -> Result<Job, StoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// 存在しない id への save は `NotFound`（upsert しない）
    async fn save(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&job.id()) {
            Some(slot) => {
                *slot = job.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(job.id())),
        }
    }
}
