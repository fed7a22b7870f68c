/// 画面で使う固定データ（人気サービス、銀行、口座、解約手順）
pub mod models;

pub use models::{
    cancellation_guide_for, find_banks, find_popular_services, Bank, BankAccount, CancellationGuide,
    Difficulty, PopularService, ACCOUNTS, BANKS, POPULAR_SERVICES,
};
