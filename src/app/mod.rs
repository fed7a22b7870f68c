/// アプリ状態とランタイム
///
/// `PrototypeApp` は画面のコールバックに対応する同期的な操作をまとめ、
/// `AppRuntime` はそれを `Arc<Mutex<_>>` で共有しながら時間経過で進む処理を動かします。
pub mod runtime;
pub mod state;
pub mod walkthrough;


pub use runtime::AppRuntime;
pub use state::{AppSnapshot, CommitSummary, PrototypeApp};
pub use walkthrough::run_walkthrough;
