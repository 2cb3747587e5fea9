//! In-memory pool for tests.
//!
//! Records every statement, serves canned responses in order, and counts
//! acquires, releases and commits so tests can check connection pairing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

use crate::database::driver::{Connection, PlaceholderStyle, Pool};
use crate::database::values::{DatabaseValue, Row};
use crate::error::{OrmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementKind {
    Fetch,
    Execute,
}

#[derive(Debug, Clone)]
pub(crate) struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub args: Vec<DatabaseValue>,
    pub limit: Option<usize>,
}

enum Response {
    Rows(Vec<Row>),
    Affected(u64),
    Failure(String),
}

#[derive(Default)]
struct State {
    acquired: AtomicUsize,
    released: AtomicUsize,
    commits: AtomicUsize,
    in_use: AtomicUsize,
    max_in_use: AtomicUsize,
    closed: AtomicBool,
    drained: Notify,
    statements: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<Response>>,
}

impl State {
    fn record(&self, kind: StatementKind, sql: &str, args: &[DatabaseValue], limit: Option<usize>) {
        self.statements.lock().unwrap().push(Statement {
            kind,
            sql: sql.to_string(),
            args: args.to_vec(),
            limit,
        });
    }

    fn next_response(&self) -> Option<Response> {
        self.responses.lock().unwrap().pop_front()
    }
}

pub(crate) struct FakePool {
    style: PlaceholderStyle,
    permits: Arc<Semaphore>,
    state: Arc<State>,
}

impl FakePool {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self::with_capacity(style, 10)
    }

    pub fn with_capacity(style: PlaceholderStyle, capacity: usize) -> Self {
        Self {
            style,
            permits: Arc::new(Semaphore::new(capacity)),
            state: Arc::new(State::default()),
        }
    }

    pub fn push_rows(&self, rows: Vec<Row>) {
        self.push(Response::Rows(rows));
    }

    pub fn push_affected(&self, affected: u64) {
        self.push(Response::Affected(affected));
    }

    pub fn push_failure(&self, message: &str) {
        self.push(Response::Failure(message.to_string()));
    }

    fn push(&self, response: Response) {
        self.state.responses.lock().unwrap().push_back(response);
    }

    /// Takes a slot out of the pool without going through `acquire`.
    pub async fn hold(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.permits).acquire_owned().await.unwrap()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.state.statements.lock().unwrap().clone()
    }

    pub fn acquired(&self) -> usize {
        self.state.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.state.commits.load(Ordering::SeqCst)
    }

    pub fn max_in_use(&self) -> usize {
        self.state.max_in_use.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakeConnection {
    state: Arc<State>,
    _permit: OwnedSemaphorePermit,
}

fn failure(message: String) -> OrmError {
    OrmError::Database(sqlx::Error::Protocol(message))
}

#[async_trait]
impl Connection for FakeConnection {
    async fn fetch(
        &mut self,
        sql: &str,
        args: &[DatabaseValue],
        limit: Option<usize>,
    ) -> Result<Vec<Row>> {
        tokio::task::yield_now().await;
        self.state.record(StatementKind::Fetch, sql, args, limit);
        match self.state.next_response() {
            Some(Response::Rows(mut rows)) => {
                if let Some(limit) = limit {
                    rows.truncate(limit);
                }
                Ok(rows)
            }
            Some(Response::Failure(message)) => Err(failure(message)),
            Some(Response::Affected(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&mut self, sql: &str, args: &[DatabaseValue]) -> Result<u64> {
        tokio::task::yield_now().await;
        self.state.record(StatementKind::Execute, sql, args, None);
        match self.state.next_response() {
            Some(Response::Affected(affected)) => Ok(affected),
            Some(Response::Failure(message)) => Err(failure(message)),
            Some(Response::Rows(_)) => Ok(0),
            None => Ok(1),
        }
    }

    async fn commit(&mut self) -> Result<()> {
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Pool for FakePool {
    type Connection = FakeConnection;

    fn placeholder_style(&self) -> PlaceholderStyle {
        self.style
    }

    async fn acquire(&self) -> Result<FakeConnection> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| OrmError::PoolClosed)?;
        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        let in_use = self.state.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_use.fetch_max(in_use, Ordering::SeqCst);
        Ok(FakeConnection {
            state: Arc::clone(&self.state),
            _permit: permit,
        })
    }

    fn release(&self, conn: FakeConnection) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
        drop(conn);
        if self.state.in_use.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.drained.notify_waiters();
        }
    }

    async fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
        self.permits.close();
        loop {
            let drained = self.state.drained.notified();
            if self.state.in_use.load(Ordering::SeqCst) == 0 {
                break;
            }
            drained.await;
        }
    }
}
