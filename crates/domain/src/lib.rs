//! # Bloqueio ドメイン層
//!
//! bloqueio（ロックアウト）追跡ワークフローの通知に関わるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **読み取り専用のレコード**: 購読者・bloqueio・tratativa・finalização は
//!   外部で作成・管理され、このシステムは読むだけ
//! - **純粋な集計ポリシー**: 未対応 bloqueio のエリア別集計や日付計算は
//!   I/O を持たない関数として定義し、単体テストで検証する
//! - **インフラ非依存**: DB やメール送信の詳細には依存しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!     ↘               ↑
//!       ──────────────
//! ```
//!
//! ## モジュール構成
//!
//! - [`backlog`] - 未対応 bloqueio のエリア別集計
//! - [`calendar`] - レポート対象日（固定タイムゾーンの暦日）
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層エラー
//! - [`incident`] - bloqueio / tratativa / finalização レコード
//! - [`notification`] - レポート種別・メールメッセージ・通知エラー
//! - [`subscriber`] - 通知購読者とロール
//!
//! ## 使用例
//!
//! ```rust
//! use bloqueio_domain::subscriber::{Subscriber, SubscriberRole};
//!
//! let subscriber = Subscriber::new("ops@example.com", SubscriberRole::Admin);
//! assert!(subscriber.has_any_role(&[SubscriberRole::Admin, SubscriberRole::Dev]));
//! ```

pub mod backlog;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod incident;
pub mod notification;
pub mod subscriber;

pub use error::DomainError;
