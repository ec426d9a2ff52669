//! `OfxMultiThreadSuite` v1.

use std::any::Any;
use std::ffi::{c_uint, c_void};
use std::panic::{self, AssertUnwindSafe};

use ofxkit_ffi::{OfxMultiThreadSuiteV1, OfxMutexHandle};

use crate::registry::{invoke, invoke_unit, log_failure};
use crate::StatusCode;

/// The host's threading services: its thread pool and its mutexes.
#[derive(Debug, Clone, Copy)]
pub struct MultiThreadSuite<'h> {
    table: &'h OfxMultiThreadSuiteV1,
}

impl<'h> MultiThreadSuite<'h> {
    pub(crate) fn new(table: &'h OfxMultiThreadSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxMultiThreadSuiteV1 {
        self.table
    }

    /// Number of CPUs the host will spread work across.
    pub fn num_cpus(&self) -> Result<u32, StatusCode> {
        let get = entry!(self.table, multiThreadNumCPUs);
        // SAFETY: multiThreadNumCPUs writes the count on success.
        unsafe { invoke(|out| get(out)) }
    }

    /// Index of the calling thread within the current `run`.
    pub fn thread_index(&self) -> Result<u32, StatusCode> {
        let get = entry!(self.table, multiThreadIndex);
        // SAFETY: multiThreadIndex writes the index on success.
        unsafe { invoke(|out| get(out)) }
    }

    /// Whether the caller runs on a thread spawned by [`Self::run`].
    pub fn is_spawned_thread(&self) -> Result<bool, StatusCode> {
        let is_spawned = entry!(self.table, multiThreadIsSpawnedThread);
        // SAFETY: takes no arguments.
        Ok(unsafe { is_spawned() } != 0)
    }

    /// Run `work(index, count)` on `threads` host threads and block until all
    /// return. Passing 0 lets the host pick the thread count.
    ///
    /// A panic inside `work` is caught on the host thread and resumed here
    /// once the host returns.
    pub fn run<F>(&self, threads: u32, work: &F) -> Result<(), StatusCode>
    where
        F: Fn(u32, u32) + Sync,
    {
        let multi_thread = entry!(self.table, multiThread);
        let job = Job {
            work,
            panic: std::sync::Mutex::new(None),
        };
        let arg = &job as *const Job<'_, F> as *mut c_void;
        tracing::trace!(threads, "Dispatching work to host threads");
        // SAFETY: `job` outlives the blocking call and `trampoline::<F>` matches its type.
        let result = invoke_unit(|| unsafe { multi_thread(Some(trampoline::<F>), threads, arg) });
        let panic = job.panic.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(payload) = panic {
            panic::resume_unwind(payload);
        }
        result
    }

    /// Create a host mutex with an initial lock count.
    pub fn create_mutex(&self, lock_count: i32) -> Result<HostMutex<'h>, StatusCode> {
        let create = entry!(self.table, mutexCreate);
        // SAFETY: mutexCreate writes the handle on success.
        let handle: OfxMutexHandle = unsafe { invoke(|out| create(out, lock_count)) }?;
        if handle.is_null() {
            return Err(StatusCode::BadHandle);
        }
        Ok(HostMutex {
            handle,
            suite: *self,
        })
    }
}

struct Job<'a, F> {
    work: &'a F,
    panic: std::sync::Mutex<Option<Box<dyn Any + Send + 'static>>>,
}

unsafe extern "C" fn trampoline<F>(index: c_uint, count: c_uint, arg: *mut c_void)
where
    F: Fn(u32, u32) + Sync,
{
    let job = &*(arg as *const Job<'_, F>);
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (job.work)(index, count))) {
        if let Ok(mut slot) = job.panic.lock() {
            slot.get_or_insert(payload);
        }
    }
}

/// A mutex owned by the host, destroyed when dropped.
///
/// Host mutexes are recursive; `lock` and `unlock` must pair up.
#[derive(Debug)]
pub struct HostMutex<'h> {
    handle: OfxMutexHandle,
    suite: MultiThreadSuite<'h>,
}

impl HostMutex<'_> {
    pub fn lock(&self) -> Result<(), StatusCode> {
        let lock = entry!(self.suite.table, mutexLock);
        invoke_unit(|| unsafe { lock(self.handle) })
    }

    pub fn unlock(&self) -> Result<(), StatusCode> {
        let unlock = entry!(self.suite.table, mutexUnLock);
        invoke_unit(|| unsafe { unlock(self.handle) })
    }

    /// `Ok(false)` when another thread holds the lock.
    pub fn try_lock(&self) -> Result<bool, StatusCode> {
        let try_lock = entry!(self.suite.table, mutexTryLock);
        // SAFETY: the handle came from this suite's mutexCreate.
        let raw = unsafe { try_lock(self.handle) };
        match StatusCode::from_raw(raw) {
            StatusCode::Failed => Ok(false),
            _ => invoke_unit(|| raw).map(|()| true),
        }
    }
}

impl Drop for HostMutex<'_> {
    fn drop(&mut self) {
        let Some(destroy) = self.suite.table.mutexDestroy else {
            return;
        };
        // SAFETY: the handle came from this suite's mutexCreate and is destroyed once.
        let raw = unsafe { destroy(self.handle) };
        let status = StatusCode::from_raw(raw);
        if !status.is_success() {
            log_failure(raw, status);
        }
    }
}
