//! # API レスポンスエンベロープ
//!
//! 内部 API の統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 内部 API の統一レスポンス型
///
/// トリガー受付・ジョブ手動実行のエンドポイントは `{ "data": T }` 形式で
/// 結果を返す。呼び出し元（トリガー送信側や外部スケジューラ）は
/// Deserialize で受け取る。
///
/// ## 使用例
///
/// ```
/// use bloqueio_shared::ApiResponse;
///
/// let response = ApiResponse::new("sent");
/// assert_eq!(response.data, "sent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
