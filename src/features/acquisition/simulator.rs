use super::mock_data::detected_subscriptions;
use super::models::{ScanMethod, ScanProgress};
use crate::features::subscriptions::Subscription;
use crate::shared::config::TimingConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// スキャンの結果
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// 100%に到達し、検出結果が確定した
    Completed(Vec<Subscription>),
    /// 途中でキャンセルされた（結果は通知しない）
    Cancelled,
}

/// 擬似スキャンを実行する
///
/// 所要時間を50分割した間隔で2%ずつ進み、100%到達後に少し待ってから
/// 固定の検出結果を一度だけ返す。
///
/// # 引数
/// * `method` - 取得方法（銀行は3秒、それ以外は2秒）
/// * `timing` - タイミング設定
/// * `progress_sender` - 進捗通知の送信先
/// * `cancel_token` - 画面離脱時にキャンセルされるトークン
///
/// # 戻り値
/// 完了時は検出結果、キャンセル時は `ScanOutcome::Cancelled`
pub async fn run_scan(
    method: ScanMethod,
    timing: &TimingConfig,
    progress_sender: Option<mpsc::UnboundedSender<ScanProgress>>,
    cancel_token: CancellationToken,
) -> ScanOutcome {
    let detected = detected_subscriptions();
    let tick = method.tick_interval(timing);
    let mut progress = ScanProgress::start(method);

    log::info!(
        "スキャン開始: method={method}, 間隔={}ms",
        tick.as_millis()
    );

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log::info!("スキャンがキャンセルされました: {}%", progress.percent);
                return ScanOutcome::Cancelled;
            }
            _ = tokio::time::sleep(tick) => {}
        }

        let complete = progress.advance(detected.len());
        if let Some(sender) = &progress_sender {
            // 受信側が閉じていてもスキャンは続行
            let _ = sender.send(progress.clone());
        }
        if complete {
            break;
        }
    }

    tokio::select! {
        _ = cancel_token.cancelled() => {
            log::info!("結果表示前にスキャンがキャンセルされました");
            return ScanOutcome::Cancelled;
        }
        _ = tokio::time::sleep(timing.scan_reveal_delay) => {}
    }

    log::info!("スキャン完了: {}件検出", detected.len());
    ScanOutcome::Completed(detected)
}
