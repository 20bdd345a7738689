//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - JobStore と JobQueue は必須。未設定なら build() が BuildError を返す
//! - 設定値の検証も build() 時に行う
//! - それ以外（Clock, IdGenerator, PathSolver, ResultCache）は既定の実装を使う
//! - 既定の IdGenerator は設定された Clock を使う

use std::sync::Arc;

use super::admission::AdmissionService;
use super::results::{ResultCache, ResultService};
use super::worker::ComputationWorker;
use super::worker_loop::WorkerLoop;
use crate::config::{ConfigError, PipelineConfig};
use crate::impls::{InMemoryJobQueue, InMemoryJobStore};
use crate::ports::{BfsSolver, Clock, IdGenerator, JobQueue, JobStore, PathSolver, SystemClock, UlidGenerator};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .with_store(store)
///     .with_queue(queue)
///     .build()?;
/// let job_id = app.admission.submit("A1", "H8").await?;
/// ```
#[derive(Default)]
pub struct AppBuilder {
    store: Option<Arc<dyn JobStore>>,
    queue: Option<Arc<dyn JobQueue>>,
    ids: Option<Arc<dyn IdGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    solver: Option<Arc<dyn PathSolver>>,
    cache: Option<Arc<ResultCache>>,
    config: PipelineConfig,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be provided before build().")]
    MissingComponents(Vec<&'static str>),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開発用: インメモリのストアとキューを使う
    pub fn in_memory(config: PipelineConfig) -> Self {
        let queue = InMemoryJobQueue::new(config.visibility_timeout);
        Self::new()
            .with_config(config)
            .with_store(Arc::new(InMemoryJobStore::new()))
            .with_queue(Arc::new(queue))
    }

    pub fn with_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_solver(mut self, solver: Arc<dyn PathSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// 既定はプロセス共有のキャッシュ（`ResultCache::shared()`）
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        self.config.validate()?;

        let (store, queue) = match (self.store, self.queue) {
            (Some(store), Some(queue)) => (store, queue),
            (store, queue) => {
                let mut missing = Vec::new();
                if store.is_none() {
                    missing.push("JobStore");
                }
                if queue.is_none() {
                    missing.push("JobQueue");
                }
                return Err(BuildError::MissingComponents(missing));
            }
        };

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        // id の時刻部分も Job の時刻と同じ Clock から取る
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));
        let solver = self.solver.unwrap_or_else(|| Arc::new(BfsSolver));
        let cache = self.cache.unwrap_or_else(ResultCache::shared);

        Ok(App {
            admission: Arc::new(AdmissionService::new(
                store.clone(),
                queue.clone(),
                ids,
                clock.clone(),
            )),
            worker: Arc::new(ComputationWorker::new(store.clone(), solver, clock)),
            results: Arc::new(ResultService::new(store, cache)),
            queue,
            config: self.config,
        })
    }
}

/// App はワイヤリング済みのパイプライン
pub struct App {
    pub admission: Arc<AdmissionService>,
    pub worker: Arc<ComputationWorker>,
    pub results: Arc<ResultService>,
    queue: Arc<dyn JobQueue>,
    config: PipelineConfig,
}

impl App {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// このアプリのキューとワーカーをつないだ WorkerLoop
    pub fn worker_loop(&self) -> WorkerLoop {
        WorkerLoop::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.worker),
            self.config.clone(),
        )
    }
}
