//! ResultService - 結果取得（read-through キャッシュ付き）
//!
//! # キャッシュ方針
//! - Completed の結果だけをキャッシュする（不変なので永久に保持してよい）
//! - Pending / Failed はキャッシュしない
//! - 追い出しはしない（TTL やサイズ制限は外側で重ねる）
//!
//! キャッシュはプロセス単位の共有状態で、`ResultCache::shared()` が
//! プロセス内で一度だけ初期化されたインスタンスを返します。

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use super::views::{CompletedResult, ResultView};
use crate::domain::{JobId, JobStatus, PipelineError};
use crate::ports::JobStore;

static SHARED_CACHE: Lazy<Arc<ResultCache>> = Lazy::new(|| Arc::new(ResultCache::new()));

/// Completed の結果のキャッシュ（並行読み書き可）
#[derive(Default)]
pub struct ResultCache {
    entries: DashMap<JobId, Arc<CompletedResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// プロセス全体で共有されるキャッシュ
    pub fn shared() -> Arc<ResultCache> {
        Arc::clone(&*SHARED_CACHE)
    }

    pub fn get(&self, job_id: &JobId) -> Option<Arc<CompletedResult>> {
        self.entries.get(job_id).map(|entry| Arc::clone(entry.value()))
    }

    /// 既にあればそれを返す（同じ Job の Completed は常に同じ内容）
    pub fn insert_if_absent(&self, result: CompletedResult) -> Arc<CompletedResult> {
        let entry = self
            .entries
            .entry(result.job_id)
            .or_insert_with(|| Arc::new(result));
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct ResultService {
    store: Arc<dyn JobStore>,
    cache: Arc<ResultCache>,
}

impl ResultService {
    pub fn new(store: Arc<dyn JobStore>, cache: Arc<ResultCache>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub async fn get_result(&self, job_id: JobId) -> Result<ResultView, PipelineError> {
        if let Some(cached) = self.cache.get(&job_id) {
            debug!(%job_id, "result cache hit");
            return Ok(ResultView::Completed((*cached).clone()));
        }

        let job = self.store.load(job_id).await?;
        match job.status() {
            JobStatus::Pending => Ok(ResultView::processing(job_id)),
            JobStatus::Failed { reason } => Ok(ResultView::Failed {
                job_id,
                reason: reason.clone(),
            }),
            JobStatus::Completed { .. } => {
                let result = CompletedResult::from_job(&job).ok_or_else(|| {
                    PipelineError::InternalInvariantViolation(format!(
                        "job {job_id} is completed but has no path"
                    ))
                })?;
                let cached = self.cache.insert_if_absent(result);
                debug!(%job_id, "result cached");
                Ok(ResultView::Completed((*cached).clone()))
            }
        }
    }

    /// エントリポイント用: クエリ文字列の job id から結果を返す
    ///
    /// - 空文字: `InvalidInput`
    /// - 形式不正: `NotFound`（存在し得ない id）
    pub async fn get_result_str(&self, job_id: &str) -> Result<ResultView, PipelineError> {
        if job_id.is_empty() {
            return Err(PipelineError::InvalidInput("job id is required".to_string()));
        }
        let job_id: JobId = job_id.parse()?;
        self.get_result(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Job, Square, find_path};
    use crate::impls::InMemoryJobStore;
    use crate::test_support::FlakyStore;
    use chrono::Utc;
    use ulid::Ulid;

    fn sq(label: &str) -> Square {
        label.parse().unwrap()
    }

    struct Fixture {
        store: Arc<FlakyStore<InMemoryJobStore>>,
        service: ResultService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(FlakyStore::new(InMemoryJobStore::new()));
        let service = ResultService::new(store.clone(), Arc::new(ResultCache::new()));
        Fixture { store, service }
    }

    async fn seeded(store: &impl JobStore, from: &str, to: &str) -> Job {
        let job = Job::new(JobId::from_ulid(Ulid::new()), sq(from), sq(to), Utc::now());
        store.create(&job).await.unwrap();
        job
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .get_result(JobId::from_ulid(Ulid::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn pending_is_processing_and_not_cached() {
        let f = fixture();
        let job = seeded(f.store.as_ref(), "A1", "H8").await;

        let view = f.service.get_result(job.id()).await.unwrap();
        assert_eq!(view, ResultView::processing(job.id()));
        assert!(f.service.cache().is_empty());
    }

    #[tokio::test]
    async fn completed_is_cached_and_served_without_store() {
        let f = fixture();
        let mut job = seeded(f.store.as_ref(), "A1", "H8").await;
        job.complete(find_path(sq("A1"), sq("H8")).unwrap(), Utc::now())
            .unwrap();
        f.store.save(&job).await.unwrap();

        let first = f.service.get_result(job.id()).await.unwrap();
        assert!(first.is_completed());
        assert_eq!(f.store.load_calls(), 1);
        assert_eq!(f.service.cache().len(), 1);

        let second = f.service.get_result(job.id()).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(f.store.load_calls(), 1);
    }

    #[tokio::test]
    async fn failed_is_reported_and_not_cached() {
        let f = fixture();
        let mut job = seeded(f.store.as_ref(), "A1", "H8").await;
        job.fail("boom", Utc::now()).unwrap();
        f.store.save(&job).await.unwrap();

        let view = f.service.get_result(job.id()).await.unwrap();
        assert_eq!(
            view,
            ResultView::Failed {
                job_id: job.id(),
                reason: "boom".to_string()
            }
        );
        assert!(f.service.cache().is_empty());

        f.service.get_result(job.id()).await.unwrap();
        assert_eq!(f.store.load_calls(), 2);
    }

    #[tokio::test]
    async fn string_entry_point_validates_id() {
        let f = fixture();

        let err = f.service.get_result_str("").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));

        let err = f.service.get_result_str("not-a-job").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
        assert_eq!(f.store.load_calls(), 0);

        let job = seeded(f.store.as_ref(), "C3", "D5").await;
        let view = f.service.get_result_str(&job.id().to_string()).await.unwrap();
        assert_eq!(view.job_id(), job.id());
    }

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let cache = ResultCache::new();
        let id = JobId::from_ulid(Ulid::new());
        let path = find_path(sq("A1"), sq("B3")).unwrap();
        let result = CompletedResult {
            job_id: id,
            source: sq("A1"),
            target: sq("B3"),
            move_count: path.move_count(),
            path,
        };

        let first = cache.insert_if_absent(result.clone());
        let second = cache.insert_if_absent(result);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn shared_cache_is_one_instance() {
        assert!(Arc::ptr_eq(&ResultCache::shared(), &ResultCache::shared()));
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_entry() {
        let store = Arc::new(InMemoryJobStore::new());
        let mut job = seeded(store.as_ref(), "A1", "H8").await;
        job.complete(find_path(sq("A1"), sq("H8")).unwrap(), Utc::now())
            .unwrap();
        store.save(&job).await.unwrap();

        let service = Arc::new(ResultService::new(store, Arc::new(ResultCache::new())));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            let id = job.id();
            handles.push(tokio::spawn(async move { service.get_result(id).await.unwrap() }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_completed());
        }
        assert_eq!(service.cache().len(), 1);
    }
}
