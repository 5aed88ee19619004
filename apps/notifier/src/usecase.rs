//! # ユースケース層
//!
//! 通知サービスのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと送信者を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: HTTP ハンドラとスケジューラはユースケースを呼ぶだけ
//!
//! ## モジュール構成
//!
//! - `recipients`: 購読者コレクションからの宛先解決
//! - `notification`: レポートのメール化と送信
//! - `trigger`: bloqueio 作成時の即時通知
//! - `report`: 定期レポート（期限到来・日次サマリー・未対応エリア）

pub mod notification;
pub mod recipients;
pub mod report;
pub mod trigger;

pub use notification::{DispatchOutcome, NotificationService, TemplateRenderer};
pub use recipients::RecipientDirectory;
pub use report::ScheduledReportRunner;
pub use trigger::BloqueioTrigger;
