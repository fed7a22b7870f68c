pub mod app;
pub mod features;
pub mod shared;

use shared::config::{initialize_application, log_initialization_complete};

/// アプリケーションのエントリーポイント
///
/// 設定とログを初期化し、tokioランタイム上で一連の画面操作を実行する。
pub fn run() {
    let init = initialize_application();
    log_initialization_complete(&init);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("tokioランタイムの作成に失敗しました: {e}");
            return;
        }
    };

    match runtime.block_on(app::run_walkthrough(init.timing)) {
        Ok(()) => log::info!("ウォークスルーが完了しました"),
        Err(e) => log::error!(
            "ウォークスルーに失敗しました: {} (重要度: {:?})",
            e.details(),
            e.severity()
        ),
    }
}
