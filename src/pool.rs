use crate::{
    connection::Connection,
    error::{Error, Result},
    unmanaged::OpenMode,
};
use libsqlite3_sys::SQLITE_MISUSE;
use std::{
    collections::VecDeque,
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, MutexGuard, Weak},
};
use tokio::sync::oneshot;

/// Pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on live connections. Must be positive.
    pub max_size: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self { max_size: 20 }
    }
}

/// A point-in-time snapshot of the pool's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub free: usize,
    pub current: usize,
    pub max: usize,
    pub waiters: usize,
}

/// A bounded pool of single-threaded connections with fair FIFO waiting.
/// Connections open lazily on acquire; frees are reused LIFO for cache
/// locality, while waiters are resumed oldest first.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    path: String,
    mode: OpenMode,
    max_size: usize,
    state: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    free: Vec<Connection>,
    waiters: VecDeque<oneshot::Sender<Connection>>,
    current: usize,
}

impl Pool {
    /// # Panics
    ///
    /// Panics when `options.max_size` is zero.
    pub fn new(path: &str, mode: OpenMode, options: PoolOptions) -> Self {
        assert!(options.max_size > 0, "max_size must be positive");
        Self {
            inner: Arc::new(PoolInner {
                path: path.into(),
                mode,
                max_size: options.max_size,
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Borrow a connection: a free one, a freshly opened one while below
    /// capacity, or — at capacity — the next released one, in FIFO order
    /// behind any earlier waiters.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let receiver = {
            let mut state = self.inner.lock_state();
            if let Some(connection) = state.free.pop() {
                return Ok(self.guard(connection));
            }
            if state.current < self.inner.max_size {
                // reserve the slot before the open so concurrent acquires
                // cannot overshoot max; give it back if the open fails
                state.current += 1;
                drop(state);
                return match Connection::open(&self.inner.path, self.inner.mode) {
                    Ok(connection) => Ok(self.guard(connection)),
                    Err(error) => {
                        self.inner.lock_state().current -= 1;
                        Err(error)
                    }
                };
            }
            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            receiver
        };
        match receiver.await {
            Ok(connection) => Ok(self.guard(connection)),
            Err(_) => Err(Error::Engine {
                code: SQLITE_MISUSE,
                message: "connection pool was dropped while waiting for a connection".into(),
            }),
        }
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.inner.lock_state();
        PoolStatus {
            free: state.free.len(),
            current: state.current,
            max: self.inner.max_size,
            waiters: state.waiters.len(),
        }
    }

    fn guard(&self, connection: Connection) -> PooledConnection {
        PooledConnection {
            connection: Some(connection),
            pool: Arc::downgrade(&self.inner),
        }
    }
}

impl PoolInner {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hand the connection to the oldest live waiter, else push it onto the
    /// free stack. Never suspends, so it is safe from both sync and async
    /// drop paths.
    fn release(&self, connection: Connection) {
        let mut state = self.lock_state();
        let mut connection = connection;
        while let Some(waiter) = state.waiters.pop_front() {
            match waiter.send(connection) {
                Ok(()) => return,
                // the waiter went away; pass it on to the next one
                Err(returned) => connection = returned,
            }
        }
        state.free.push(connection);
    }
}

/// A borrowed pool connection, dereferencing to [`Connection`] — the full
/// single-thread API applies, transactions included. Every exit path
/// returns the connection to the pool; if the pool is already gone, the
/// connection closes instead.
pub struct PooledConnection {
    connection: Option<Connection>,
    pool: Weak<PoolInner>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.connection
            .as_ref()
            .expect("connection is present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.connection
            .as_mut()
            .expect("connection is present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Some(pool) = self.pool.upgrade() {
                pool.release(connection);
            }
        }
    }
}
