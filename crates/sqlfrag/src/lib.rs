//! # sqlfrag
//!
//! Incremental construction of SQL DML statements from escaped fragments.
//!
//! ## Features
//!
//! - **Escaping**: identifiers (`db.table.col`, `table.*`), values, lists,
//!   sub-queries, aliases and collations through [`QueryEscaper`]
//! - **Fragment builder**: SELECT / INSERT / REPLACE / UPDATE / DELETE with
//!   joins, grouped conditions, compound queries, CTEs and upserts
//! - **Text only**: nothing here opens a connection; plug a driver in
//!   through [`SqlExecutor`]
//! - **Hooks**: inspect, rewrite or abort statements before they run, with a
//!   `tracing` hook included
//!
//! ## Example
//!
//! ```ignore
//! use sqlfrag::prelude::*;
//!
//! let e: QueryEscaper = QueryEscaper::default();
//! let mut q = DmlQueryBuilder::new();
//! q.select([e.column("u.id", ""), e.result_column("u.name", "name")])
//!     .from(&e.table("users", "u"))
//!     .join(&e.table("roles", "r"), "LEFT")
//!     .on("`u`.`role_id`", "`r`.`id`")
//!     .where_in("`r`.`name`", vec!["'admin'", "'owner'"], false)
//!     .order_by("`u`.`id`", true)
//!     .limit(20, Some(40));
//!
//! let sql = q.get_select_query();
//! ```

pub mod builder;
pub mod error;
pub mod escape;
pub mod exec;
pub mod ident;
pub mod monitor;
pub mod prelude;
pub mod value;

pub use builder::{
    Clause, ConditionKeyword, Connector, DmlFragments, DmlQueryBuilder, JoinState, SelectTarget,
    SortDir, implode_query,
};
pub use error::{FragError, FragResult};
pub use escape::QueryEscaper;
pub use exec::{RetryConfig, RetryingExecutor, SqlExecutor};
pub use ident::{BacktickEscaper, DoubleQuoteEscaper, IdentifierEscaper};
pub use monitor::{
    CompositeHook, HookAction, QueryContext, QueryHook, QueryResult, QueryType, TracingSqlHook,
};
pub use value::Value;
