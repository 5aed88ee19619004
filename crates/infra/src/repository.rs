//! # リポジトリ実装
//!
//! 通知の元になる 4 つのコレクションを読み取るリポジトリを提供する。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: レコードは外部で作成される。このシステムは書き込まない
//! - **DynamoDB 実装**: 各コレクションを 1 テーブルとしてスキャンする
//! - **テスタビリティ**: トレイト経由でモック可能な設計（`mock` モジュール）

pub mod bloqueio_repository;
pub mod finalizacao_repository;
pub mod subscriber_repository;
pub mod tratativa_repository;

pub use bloqueio_repository::{BloqueioRepository, DynamoDbBloqueioRepository};
pub use finalizacao_repository::{DynamoDbFinalizacaoRepository, FinalizacaoRepository};
pub use subscriber_repository::{DynamoDbSubscriberRepository, SubscriberRepository};
pub use tratativa_repository::{DynamoDbTratativaRepository, TratativaRepository};
