//! Join clauses and the ON/USING state machine.
//!
//! Every join starts out [`JoinState::Unfinished`] (or [`JoinState::Natural`],
//! which needs no condition). The first ON or USING condition decides how the
//! join is keyed; from then on only conditions of the same kind are accepted.
//!
//! | state        | On        | Using       | GroupStart    | GroupEnd     |
//! |--------------|-----------|-------------|---------------|--------------|
//! | `Unfinished` | open ON   | open USING  | open `ON (`   | -            |
//! | `On`         | extend ON | -           | extend `(`    | close `)`    |
//! | `Using`      | -         | extend list | -             | -            |
//! | `Natural`    | -         | -           | -             | -            |
//! | `None`       | -         | -           | -             | -            |
//!
//! `-` leaves the join text and the state untouched.

use super::fragments::{ConditionKeyword, ConditionList, TableRef};

/// Condition state of the most recent join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinState {
    /// No join has been added.
    #[default]
    None,
    /// Waiting for an ON or USING condition.
    Unfinished,
    /// A NATURAL join; no condition allowed.
    Natural,
    /// Keyed by ON.
    On,
    /// Keyed by USING.
    Using,
}

impl JoinState {
    pub fn is_unfinished(self) -> bool {
        self == JoinState::Unfinished
    }

    /// `"on"`, `"using"` or `""`.
    pub fn join_type(self) -> &'static str {
        match self {
            JoinState::On => "on",
            JoinState::Using => "using",
            _ => "",
        }
    }
}

/// Input to the join state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinEvent {
    On,
    Using,
    GroupStart,
    GroupEnd,
}

/// What the fragment store must do to the current join's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAction {
    Ignore,
    OpenOn,
    ExtendOn,
    OpenUsing,
    ExtendUsing,
    OpenOnGroup,
    ExtendOnGroup,
    CloseOnGroup,
}

/// Compute the action and next state for `event` arriving in `state`.
pub fn transition(state: JoinState, event: JoinEvent) -> (JoinAction, JoinState) {
    use JoinEvent as E;
    use JoinState as S;

    match (state, event) {
        (S::Unfinished, E::On) => (JoinAction::OpenOn, S::On),
        (S::On, E::On) => (JoinAction::ExtendOn, S::On),
        (S::Unfinished, E::Using) => (JoinAction::OpenUsing, S::Using),
        (S::Using, E::Using) => (JoinAction::ExtendUsing, S::Using),
        (S::Unfinished, E::GroupStart) => (JoinAction::OpenOnGroup, S::On),
        (S::On, E::GroupStart) => (JoinAction::ExtendOnGroup, S::On),
        (S::On, E::GroupEnd) => (JoinAction::CloseOnGroup, S::On),
        (state, _) => (JoinAction::Ignore, state),
    }
}

/// Map a join type to its keyword.
///
/// Empty → `JOIN`, `STRAIGHT` → `STRAIGHT_JOIN`, anything else is uppercased
/// and suffixed with ` JOIN`.
pub fn join_keyword(join_type: &str) -> String {
    let join_type = join_type.trim();
    if join_type.is_empty() {
        "JOIN".to_string()
    } else if join_type.eq_ignore_ascii_case("STRAIGHT") {
        "STRAIGHT_JOIN".to_string()
    } else {
        format!("{} JOIN", join_type.to_ascii_uppercase())
    }
}

/// The condition attached to one join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JoinCondition {
    #[default]
    None,
    On(ConditionList),
    Using(Vec<String>),
}

/// A single `[TYPE] JOIN table [hints] [ON ... | USING (...)]` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub keyword: String,
    pub table: TableRef,
    pub condition: JoinCondition,
}

impl JoinClause {
    pub fn new(keyword: String, table: TableRef) -> Self {
        Self {
            keyword,
            table,
            condition: JoinCondition::None,
        }
    }

    pub fn is_natural(&self) -> bool {
        self.keyword.contains("NATURAL")
    }

    /// The ON list, created on first use.
    ///
    /// Returns `None` when the join is already keyed by USING.
    pub fn on_list(&mut self) -> Option<&mut ConditionList> {
        if matches!(self.condition, JoinCondition::None) {
            self.condition = JoinCondition::On(ConditionList::default());
        }
        match &mut self.condition {
            JoinCondition::On(list) => Some(list),
            _ => None,
        }
    }

    /// The USING column list, created on first use.
    ///
    /// Returns `None` when the join is already keyed by ON.
    pub fn using_list(&mut self) -> Option<&mut Vec<String>> {
        if matches!(self.condition, JoinCondition::None) {
            self.condition = JoinCondition::Using(Vec::new());
        }
        match &mut self.condition {
            JoinCondition::Using(cols) => Some(cols),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("{} {}", self.keyword, self.table.render());
        match &self.condition {
            JoinCondition::None => {}
            JoinCondition::On(list) => {
                let on = list.render(ConditionKeyword::On.to_sql());
                if !on.is_empty() {
                    out.push(' ');
                    out.push_str(&on);
                }
            }
            JoinCondition::Using(cols) => {
                out.push_str(" USING (");
                out.push_str(&cols.join(", "));
                out.push(')');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(join_keyword(""), "JOIN");
        assert_eq!(join_keyword("STRAIGHT"), "STRAIGHT_JOIN");
        assert_eq!(join_keyword("left"), "LEFT JOIN");
        assert_eq!(join_keyword("NATURAL LEFT OUTER"), "NATURAL LEFT OUTER JOIN");
    }

    #[test]
    fn unfinished_join_accepts_either_condition() {
        assert_eq!(
            transition(JoinState::Unfinished, JoinEvent::On),
            (JoinAction::OpenOn, JoinState::On)
        );
        assert_eq!(
            transition(JoinState::Unfinished, JoinEvent::Using),
            (JoinAction::OpenUsing, JoinState::Using)
        );
        assert_eq!(
            transition(JoinState::Unfinished, JoinEvent::GroupStart),
            (JoinAction::OpenOnGroup, JoinState::On)
        );
    }

    #[test]
    fn on_and_using_are_exclusive() {
        assert_eq!(
            transition(JoinState::Using, JoinEvent::On),
            (JoinAction::Ignore, JoinState::Using)
        );
        assert_eq!(
            transition(JoinState::Using, JoinEvent::GroupStart),
            (JoinAction::Ignore, JoinState::Using)
        );
        assert_eq!(
            transition(JoinState::Using, JoinEvent::GroupEnd),
            (JoinAction::Ignore, JoinState::Using)
        );
        assert_eq!(
            transition(JoinState::On, JoinEvent::Using),
            (JoinAction::Ignore, JoinState::On)
        );
    }

    #[test]
    fn natural_and_missing_joins_ignore_conditions() {
        for state in [JoinState::Natural, JoinState::None] {
            for event in [
                JoinEvent::On,
                JoinEvent::Using,
                JoinEvent::GroupStart,
                JoinEvent::GroupEnd,
            ] {
                assert_eq!(transition(state, event), (JoinAction::Ignore, state));
            }
        }
    }

    #[test]
    fn join_type_names() {
        assert_eq!(JoinState::On.join_type(), "on");
        assert_eq!(JoinState::Using.join_type(), "using");
        assert_eq!(JoinState::Unfinished.join_type(), "");
        assert!(JoinState::Unfinished.is_unfinished());
        assert!(!JoinState::Natural.is_unfinished());
    }
}
