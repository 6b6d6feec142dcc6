//! Domain logic for the StarQuest backend: quest lifecycle rules, star ledger
//! arithmetic, and input validation. No I/O lives here.

pub mod error;
pub mod ledger;
pub mod quest_lifecycle;
pub mod suggestion;
pub mod types;
pub mod validation;
