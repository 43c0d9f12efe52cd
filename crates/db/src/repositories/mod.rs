pub mod character_repo;
pub mod invite_code_repo;
pub mod project_repo;
pub mod research_repo;
pub mod settlement_repo;
pub mod treasury_repo;

pub use character_repo::CharacterRepo;
pub use invite_code_repo::InviteCodeRepo;
pub use project_repo::ProjectRepo;
pub use research_repo::ResearchRepo;
pub use settlement_repo::SettlementRepo;
pub use treasury_repo::TreasuryRepo;
