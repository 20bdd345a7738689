//! テスト用の ports 実装（障害注入・呼び出し回数の計測）

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Job, JobId, KnightPath, PathError, Square};
use crate::ports::{Delivery, JobQueue, JobStore, PathSolver, QueueError, StoreError};

/// 常に失敗するキュー
pub struct FailingQueue;

#[async_trait]
impl JobQueue for FailingQueue {
    async fn push(&self, _job_id: JobId) -> Result<(), QueueError> {
        Err(QueueError::OperationFailed("queue is down".into()))
    }

    async fn pop(&self, _wait: Duration) -> Result<Option<Delivery>, QueueError> {
        Err(QueueError::OperationFailed("queue is down".into()))
    }

    async fn ack(&self, _delivery: &Delivery) -> Result<(), QueueError> {
        Err(QueueError::OperationFailed("queue is down".into()))
    }

    async fn release(&self, _delivery: &Delivery) -> Result<(), QueueError> {
        Err(QueueError::OperationFailed("queue is down".into()))
    }
}

#[derive(Default)]
struct Faults {
    create: Option<StoreError>,
    load: Option<StoreError>,
    /// 次の n 回の save を失敗させる
    saves: usize,
}

/// 任意の JobStore を包み、障害注入と呼び出し回数の計測を行う
pub struct FlakyStore<S> {
    inner: S,
    faults: Mutex<Faults>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl<S: JobStore> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn fail_creates(&self, err: StoreError) {
        self.faults.lock().unwrap().create = Some(err);
    }

    pub fn fail_loads(&self, err: StoreError) {
        self.faults.lock().unwrap().load = Some(err);
    }

    pub fn heal_loads(&self) {
        self.faults.lock().unwrap().load = None;
    }

    pub fn fail_next_saves(&self, n: usize) {
        self.faults.lock().unwrap().saves = n;
    }

    pub fn load_calls(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// 成功・失敗を問わない save の呼び出し回数
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: JobStore> JobStore for FlakyStore<S> {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let fault = self.faults.lock().unwrap().create.clone();
        if let Some(err) = fault {
            return Err(err);
        }
        self.inner.create(job).await
    }

    async fn load(&self, id: JobId) -> Result<Job, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let fault = self.faults.lock().unwrap().load.clone();
        if let Some(err) = fault {
            return Err(err);
        }
        self.inner.load(id).await
    }

    async fn save(&self, job: &Job) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let fail = {
            let mut faults = self.faults.lock().unwrap();
            let fail = faults.saves > 0;
            faults.saves = faults.saves.saturating_sub(1);
            fail
        };
        if fail {
            return Err(StoreError::Unavailable("write timed out".into()));
        }
        self.inner.save(job).await
    }
}

/// 常に到達不能を返す solver（不変条件違反の再現用）
pub struct UnreachableSolver;

impl PathSolver for UnreachableSolver {
    fn solve(&self, source: Square, target: Square) -> Result<KnightPath, PathError> {
        Err(PathError::Unreachable {
            start: source,
            goal: target,
        })
    }
}
