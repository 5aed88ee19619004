//! # bloqueio インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはリポジトリトレイトと通知送信トレイトの具体的な実装を提供する。
//! 外部システムの詳細をカプセル化し、ユースケースをインフラの変更から保護する。
//!
//! ## 責務
//!
//! - **コレクション読み取り**: DynamoDB テーブルとして保存された 4 つのコレクション
//! - **メール送信**: SendGrid / SES / SMTP / Noop
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//!     ↘        ↓
//!       shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`dynamodb`] - DynamoDB 接続管理とスキャン
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use bloqueio_infra::{dynamodb, repository::DynamoDbBloqueioRepository};
//!
//! async fn setup() {
//!     let client = dynamodb::create_client(Some("http://localhost:18000")).await;
//!     let bloqueios = DynamoDbBloqueioRepository::new(client, "bloqueios".to_string());
//! }
//! ```

pub mod dynamodb;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::InfraError;
