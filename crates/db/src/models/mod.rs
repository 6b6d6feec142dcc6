pub mod ledger;
pub mod prize;
pub mod quest;
pub mod redemption;
pub mod seeker;
pub mod suggestion;
