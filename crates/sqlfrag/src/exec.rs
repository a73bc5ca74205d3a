//! Execution-side collaborators.
//!
//! The builder never talks to a database. Callers plug their driver in
//! through [`SqlExecutor`] and can wrap it in a [`RetryingExecutor`], which
//! runs [`QueryHook`]s and re-issues statements that failed with a deadlock.
//!
//! ```ignore
//! use sqlfrag::{DmlQueryBuilder, RetryConfig, RetryingExecutor, TracingSqlHook};
//! use std::time::Duration;
//!
//! let exec = RetryingExecutor::new(my_driver)
//!     .with_config(RetryConfig::new().with_max_retries(5).with_backoff(Duration::from_millis(20)))
//!     .with_hook(TracingSqlHook::new());
//!
//! let mut q = DmlQueryBuilder::new();
//! q.update("counters").set([("n", Some("n + 1"))]).where_("id", "7");
//! let affected = exec.execute(&q.get_update_query()).await?;
//! ```

use crate::error::{FragError, FragResult};
use crate::monitor::{CompositeHook, HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A driver able to run one SQL statement.
pub trait SqlExecutor: Send + Sync {
    /// Execute `sql` and return the number of affected rows.
    ///
    /// Drivers should report deadlocks as [`FragError::Deadlock`]; see
    /// [`FragError::from_driver_message`].
    fn execute(&self, sql: &str) -> impl Future<Output = FragResult<u64>> + Send;
}

impl<T: SqlExecutor> SqlExecutor for Arc<T> {
    fn execute(&self, sql: &str) -> impl Future<Output = FragResult<u64>> + Send {
        (**self).execute(sql)
    }
}

/// Retry and timeout settings for [`RetryingExecutor`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after a deadlock. `0` disables retries.
    pub max_retries: u32,
    /// Pause between attempts.
    pub backoff: Duration,
    /// Per-attempt timeout. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(50),
            query_timeout: None,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Fail on the first deadlock.
    pub fn no_retry(mut self) -> Self {
        self.max_retries = 0;
        self
    }
}

/// Wraps an executor with hooks, deadlock retries and an optional timeout.
///
/// Hooks run once per statement; every retry sends the SQL the hooks
/// settled on, unchanged.
pub struct RetryingExecutor<E> {
    inner: E,
    config: RetryConfig,
    hook: CompositeHook,
}

impl<E: SqlExecutor> RetryingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            config: RetryConfig::default(),
            hook: CompositeHook::new(),
        }
    }

    pub fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a hook; hooks run in the order they were added.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = self.hook.add(hook);
        self
    }

    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = self.hook.add_arc(hook);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Execute with a tag that hooks and logs can use to identify the query.
    pub async fn execute_tagged(&self, tag: &str, sql: &str) -> FragResult<u64> {
        self.run(QueryContext::new(sql).with_tag(tag)).await
    }

    fn apply_hooks(&self, ctx: &mut QueryContext) -> FragResult<()> {
        match self.hook.before_query(ctx) {
            HookAction::Continue => Ok(()),
            HookAction::ModifySql {
                exec_sql,
                canonical_sql,
            } => {
                ctx.exec_sql = exec_sql;
                if let Some(canonical_sql) = canonical_sql {
                    ctx.canonical_sql = canonical_sql;
                }
                ctx.query_type = QueryType::from_sql(&ctx.canonical_sql);
                Ok(())
            }
            HookAction::Abort(reason) => Err(FragError::Aborted(reason)),
        }
    }

    async fn execute_with_timeout(&self, sql: &str) -> FragResult<u64> {
        match self.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.inner.execute(sql))
                .await
                .map_err(|_| FragError::Timeout(timeout))?,
            None => self.inner.execute(sql).await,
        }
    }

    async fn run(&self, mut ctx: QueryContext) -> FragResult<u64> {
        if ctx.exec_sql.trim().is_empty() {
            return Err(FragError::validation("refusing to execute an empty statement"));
        }
        self.apply_hooks(&mut ctx)?;

        loop {
            let start = Instant::now();
            let result = self.execute_with_timeout(&ctx.exec_sql).await;
            let report = match &result {
                Ok(affected) => QueryResult::Affected(*affected),
                Err(err) => QueryResult::error(err.to_string()),
            };
            self.hook.after_query(&ctx, start.elapsed(), &report);

            match result {
                Err(err) if err.is_deadlock() && ctx.attempt <= self.config.max_retries => {
                    tracing::warn!(
                        target: "sqlfrag.exec",
                        attempt = ctx.attempt,
                        max_retries = self.config.max_retries,
                        query_type = %ctx.query_type,
                        error = %err,
                        "deadlock detected, retrying statement"
                    );
                    tokio::time::sleep(self.config.backoff).await;
                    ctx.attempt += 1;
                }
                Err(err) => {
                    tracing::debug!(
                        target: "sqlfrag.exec",
                        attempt = ctx.attempt,
                        error = %err,
                        "statement failed"
                    );
                    return Err(err);
                }
                Ok(affected) => return Ok(affected),
            }
        }
    }
}

impl<E: SqlExecutor> SqlExecutor for RetryingExecutor<E> {
    fn execute(&self, sql: &str) -> impl Future<Output = FragResult<u64>> + Send {
        self.run(QueryContext::new(sql))
    }
}

impl<E> std::fmt::Debug for RetryingExecutor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingExecutor")
            .field("config", &self.config)
            .field("hook", &self.hook)
            .finish_non_exhaustive()
    }
}
