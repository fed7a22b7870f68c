use crate::features::subscriptions::{Frequency, Subscription};

/// スキャンで「検出」される固定のサブスクリプション（すべて選択済み）
pub fn detected_subscriptions() -> Vec<Subscription> {
    vec![
        Subscription::new("1", "Netflix", 15.99, Frequency::Monthly, "Dec 20")
            .with_category("entertainment"),
        Subscription::new("2", "Spotify", 9.99, Frequency::Monthly, "Dec 22")
            .with_category("entertainment"),
        Subscription::new("3", "Adobe CC", 54.99, Frequency::Monthly, "Dec 25"),
        Subscription::new("4", "iCloud", 2.99, Frequency::Monthly, "Dec 28")
            .with_logo("i")
            .with_category("utilities"),
        Subscription::new("5", "YouTube Premium", 13.99, Frequency::Monthly, "Jan 1")
            .with_category("entertainment"),
        Subscription::new("6", "ChatGPT Plus", 20.0, Frequency::Monthly, "Jan 3"),
        Subscription::new("7", "Figma", 144.0, Frequency::Yearly, "Mar 15"),
        Subscription::new("8", "GitHub Pro", 4.0, Frequency::Monthly, "Jan 5")
            .with_category("utilities"),
    ]
}

/// 通知画面で登録がない場合に表示する見本
pub fn demo_notification_subscription() -> Subscription {
    Subscription::new("demo", "Netflix", 15.99, Frequency::Monthly, "Dec 20")
}
