//! # bloqueio 作成トリガーハンドラ
//!
//! レコード作成イベントの発行側から呼ばれ、新規 bloqueio を即時通知する。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /internal/triggers/bloqueios
//! ```
//!
//! リクエストボディは保存形式（camelCase）の bloqueio レコード。
//! 送信に失敗しても `202 Accepted` を返す。コレクションの読み取り失敗のみ `500`。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bloqueio_domain::incident::Bloqueio;
use bloqueio_shared::ApiResponse;
use serde::Serialize;

use crate::{
    error::NotifierError,
    usecase::{BloqueioTrigger, DispatchOutcome},
};

/// トリガーハンドラーの State
pub struct TriggerState {
    pub trigger: BloqueioTrigger,
}

/// 通知結果 DTO
#[derive(Debug, Serialize)]
pub struct DispatchOutcomeDto {
    pub status:     &'static str,
    pub recipients: usize,
}

impl From<DispatchOutcome> for DispatchOutcomeDto {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            status:     outcome.status(),
            recipients: outcome.recipients(),
        }
    }
}

/// bloqueio 作成イベントを受け付ける
#[tracing::instrument(skip_all)]
pub async fn handle_bloqueio_created(
    State(state): State<Arc<TriggerState>>,
    Json(bloqueio): Json<Bloqueio>,
) -> Result<Response, NotifierError> {
    let outcome = state.trigger.on_created(bloqueio).await?;

    let response = ApiResponse::new(DispatchOutcomeDto::from(outcome));

    Ok((StatusCode::ACCEPTED, Json(response)).into_response())
}
