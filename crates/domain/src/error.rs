//! # ドメイン層エラー定義
//!
//! ドメインの値を構築する際の不正な状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//!
//! レコードのフィールド自体は検証しない（欠落したフィールドはテンプレートで
//! 空文字として描画される）。このエラーは設定値やスケジュール定義など、
//! システム側が組み立てる値の検証に使う。
//!
//! ## 使用例
//!
//! ```rust
//! use bloqueio_domain::DomainError;
//!
//! fn parse_days(value: i64) -> Result<u32, DomainError> {
//!     u32::try_from(value)
//!         .map_err(|_| DomainError::Validation(format!("日数が不正です: {value}")))
//! }
//!
//! assert!(parse_days(-1).is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 値がドメインルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 存在しないタイムゾーン名
    /// - 範囲外の時刻指定
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 日付計算の範囲外
    ///
    /// 暦日の加減算が chrono の表現範囲を超えた場合に使用する。
    #[error("日付が表現範囲を超えました: {0}")]
    DateOutOfRange(String),
}
