//! Incremental DML query construction.
//!
//! Two layers:
//! - [`DmlFragments`]: one slot per SQL clause, the low-level `sql_*`
//!   mutators, the join state machine and the `get_*_query` assemblers.
//! - [`DmlQueryBuilder`]: chainable methods that normalize their arguments
//!   and delegate to the fragment store.
//!
//! Fragments are stored as typed nodes and rendered to text only when a
//! statement is assembled. Assembly reads the fragments without consuming
//! them, so a builder can produce several statement types.

mod clauses;
mod fluent;
mod fragments;
mod join;

pub use clauses::{Clause, DmlFragments, implode_query};
pub use fluent::DmlQueryBuilder;
pub use fragments::{
    Compound, ConditionKeyword, ConditionList, Connector, CteDefinition, ModeList, SelectTarget,
    SortDir, TableRef,
};
pub use join::{
    JoinAction, JoinClause, JoinCondition, JoinEvent, JoinState, join_keyword, transition,
};
