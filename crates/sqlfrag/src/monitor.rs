//! Statement hooks.
//!
//! Hooks run in front of an [`SqlExecutor`](crate::exec::SqlExecutor) and may
//! inspect, rewrite or abort each statement:
//!
//! ```ignore
//! use sqlfrag::monitor::{HookAction, QueryContext, QueryHook};
//!
//! struct NoDeleteWithoutWhere;
//!
//! impl QueryHook for NoDeleteWithoutWhere {
//!     fn before_query(&self, ctx: &QueryContext) -> HookAction {
//!         if ctx.exec_sql.starts_with("DELETE") && !ctx.exec_sql.contains("WHERE") {
//!             return HookAction::Abort("DELETE without WHERE".into());
//!         }
//!         HookAction::Continue
//!     }
//! }
//! ```

mod hooks;
mod tracing_hook;
mod types;

#[cfg(test)]
mod tests;

pub use hooks::CompositeHook;
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
