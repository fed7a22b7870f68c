use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// 追加シートに並ぶ人気サービス
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopularService {
    pub name: &'static str,
    pub logo: &'static str,
    pub price: f64,
}

pub const POPULAR_SERVICES: [PopularService; 12] = [
    PopularService { name: "Netflix", logo: "N", price: 15.99 },
    PopularService { name: "Spotify", logo: "S", price: 9.99 },
    PopularService { name: "Disney+", logo: "D", price: 13.99 },
    PopularService { name: "HBO Max", logo: "H", price: 15.99 },
    PopularService { name: "Apple Music", logo: "A", price: 10.99 },
    PopularService { name: "Amazon Prime", logo: "P", price: 14.99 },
    PopularService { name: "YouTube Premium", logo: "Y", price: 13.99 },
    PopularService { name: "Hulu", logo: "H", price: 17.99 },
    PopularService { name: "Adobe CC", logo: "A", price: 54.99 },
    PopularService { name: "Microsoft 365", logo: "M", price: 9.99 },
    PopularService { name: "ChatGPT Plus", logo: "C", price: 20.0 },
    PopularService { name: "Notion", logo: "N", price: 8.0 },
];

/// 連携候補の銀行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bank {
    pub id: &'static str,
    pub name: &'static str,
    pub logo: &'static str,
}

pub const BANKS: [Bank; 6] = [
    Bank { id: "chase", name: "Chase", logo: "C" },
    Bank { id: "bofa", name: "Bank of America", logo: "B" },
    Bank { id: "wells", name: "Wells Fargo", logo: "W" },
    Bank { id: "citi", name: "Citibank", logo: "C" },
    Bank { id: "capital", name: "Capital One", logo: "C" },
    Bank { id: "usbank", name: "US Bank", logo: "U" },
];

/// スキャン対象にできる口座
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankAccount {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: &'static str,
}

pub const ACCOUNTS: [BankAccount; 4] = [
    BankAccount { id: "checking", name: "Checking ••••4521", kind: "checking" },
    BankAccount { id: "savings", name: "Savings ••••8932", kind: "savings" },
    BankAccount { id: "credit1", name: "Credit Card ••••2847", kind: "credit" },
    BankAccount { id: "credit2", name: "Credit Card ••••9163", kind: "credit" },
];

/// 名前の部分一致（大文字小文字を区別しない）
fn matches_query(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.trim().to_lowercase())
}

/// 検索語で人気サービスを絞り込む
pub fn find_popular_services(query: &str) -> Vec<&'static PopularService> {
    POPULAR_SERVICES
        .iter()
        .filter(|s| matches_query(s.name, query))
        .collect()
}

/// 検索語で銀行を絞り込む
pub fn find_banks(query: &str) -> Vec<&'static Bank> {
    BANKS.iter().filter(|b| matches_query(b.name, query)).collect()
}

/// 解約の難易度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// サービスごとの解約手順
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationGuide {
    pub method: &'static str,
    pub difficulty: Difficulty,
    pub steps: Vec<&'static str>,
    pub link: Option<&'static str>,
    pub phone: Option<&'static str>,
}

static DEFAULT_GUIDE: Lazy<CancellationGuide> = Lazy::new(|| CancellationGuide {
    method: "Website",
    difficulty: Difficulty::Medium,
    steps: vec![
        "Log in to your account on the service website",
        "Navigate to Account or Subscription settings",
        "Look for Cancel or Cancel Subscription option",
        "Follow the cancellation flow",
    ],
    link: None,
    phone: None,
});

static CANCELLATION_GUIDES: Lazy<HashMap<&'static str, CancellationGuide>> = Lazy::new(|| {
    let mut guides = HashMap::new();
    guides.insert(
        "Netflix",
        CancellationGuide {
            method: "Website",
            difficulty: Difficulty::Easy,
            steps: vec![
                "Go to netflix.com and sign in",
                "Click your profile icon → Account",
                "Click 'Cancel Membership'",
                "Confirm cancellation",
            ],
            link: Some("https://netflix.com/account"),
            phone: None,
        },
    );
    guides.insert(
        "Spotify",
        CancellationGuide {
            method: "Website",
            difficulty: Difficulty::Easy,
            steps: vec![
                "Go to spotify.com/account",
                "Click 'Change plan'",
                "Scroll down and click 'Cancel Premium'",
                "Confirm cancellation",
            ],
            link: Some("https://spotify.com/account"),
            phone: None,
        },
    );
    guides.insert(
        "Adobe CC",
        CancellationGuide {
            method: "Phone",
            difficulty: Difficulty::Hard,
            steps: vec![
                "Call Adobe customer support",
                "Navigate through phone menu to cancellation",
                "Speak with retention specialist",
                "Confirm cancellation (may require early termination fee)",
            ],
            link: None,
            phone: Some("1-800-833-6687"),
        },
    );
    guides
});

/// サービス名から解約手順を引く（未登録なら汎用手順）
pub fn cancellation_guide_for(service_name: &str) -> &'static CancellationGuide {
    CANCELLATION_GUIDES
        .get(service_name)
        .unwrap_or_else(|| Lazy::force(&DEFAULT_GUIDE))
}
