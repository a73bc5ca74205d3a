//! Convenient imports for typical `sqlfrag` usage.
//!
//! ```ignore
//! use sqlfrag::prelude::*;
//! ```

pub use crate::{
    Clause, DmlQueryBuilder, FragError, FragResult, IdentifierEscaper, QueryEscaper, SqlExecutor,
    Value,
};
pub use crate::{RetryConfig, RetryingExecutor};
