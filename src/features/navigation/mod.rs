/// 画面遷移モジュール
///
/// 画面の集合と、操作から次の画面を決める遷移表を提供します。
pub mod router;
pub mod screen;

pub use router::{available_triggers, next_screen, Router, TransitionGuard, Trigger};
pub use screen::Screen;
