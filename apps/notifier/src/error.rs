//! # Notifier エラー定義
//!
//! 通知サービス固有のエラーと、HTTP レスポンスへの変換を定義する。

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use bloqueio_domain::{DomainError, notification::NotificationError};
use bloqueio_infra::InfraError;
use bloqueio_shared::{ErrorResponse, event_log::error};
use thiserror::Error;

/// 通知サービスで発生するエラー
#[derive(Debug, Error)]
pub enum NotifierError {
   /// リソースが見つからない（未知のジョブ名など）
   #[error("リソースが見つかりません: {0}")]
   NotFound(String),

   /// コレクションの読み取りに失敗
   #[error("リポジトリエラー: {0}")]
   Repository(#[from] InfraError),

   /// メールの生成・送信に失敗
   #[error("通知エラー: {0}")]
   Delivery(#[from] NotificationError),

   /// 内部エラー
   #[error("内部エラー: {0}")]
   Internal(String),
}

impl From<DomainError> for NotifierError {
   fn from(err: DomainError) -> Self {
      NotifierError::Internal(err.to_string())
   }
}

impl IntoResponse for NotifierError {
   fn into_response(self) -> Response {
      let body = match &self {
         NotifierError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
         NotifierError::Repository(e) => {
            tracing::error!(
               error.category = error::category::INFRASTRUCTURE,
               error.kind = error::kind::DATABASE,
               "リポジトリエラー: {}",
               e
            );
            ErrorResponse::internal_error()
         }
         NotifierError::Delivery(e) => {
            let kind = match e {
               NotificationError::SendFailed(_) => error::kind::MAIL_DELIVERY,
               NotificationError::TemplateFailed(_) => error::kind::TEMPLATE,
            };
            tracing::error!(
               error.category = error::category::EXTERNAL_SERVICE,
               error.kind = kind,
               "通知エラー: {}",
               e
            );
            ErrorResponse::internal_error()
         }
         NotifierError::Internal(msg) => {
            tracing::error!(error.kind = error::kind::INTERNAL, "内部エラー: {}", msg);
            ErrorResponse::internal_error()
         }
      };

      let status =
         StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
      (status, Json(body)).into_response()
   }
}
