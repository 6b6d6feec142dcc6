//! Repository layer: one unit struct per table (or aggregate), each with
//! associated async functions taking a `&PgPool`.

pub mod ledger_repo;
pub mod prize_repo;
pub mod quest_repo;
pub mod redemption_repo;
pub mod seeker_repo;
pub mod suggestion_repo;

pub use ledger_repo::LedgerRepo;
pub use prize_repo::PrizeRepo;
pub use quest_repo::QuestRepo;
pub use redemption_repo::RedemptionRepo;
pub use seeker_repo::SeekerRepo;
pub use suggestion_repo::SuggestionRepo;
