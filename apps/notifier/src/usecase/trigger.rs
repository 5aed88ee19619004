//! # bloqueio 作成トリガー
//!
//! 新しい bloqueio が登録されたときに admin / dev へ即時通知する。
//!
//! 呼び出し元（レコード作成イベントの発行側）には、送信に失敗しても
//! 成功として応答する。コレクションの読み取り失敗だけはエラーとして返す。

use std::sync::Arc;

use bloqueio_domain::{incident::Bloqueio, notification::Report};

use super::{DispatchOutcome, NotificationService};
use crate::error::NotifierError;

/// bloqueio 作成トリガー
#[derive(Clone)]
pub struct BloqueioTrigger {
    notification: Arc<NotificationService>,
}

impl BloqueioTrigger {
    pub fn new(notification: Arc<NotificationService>) -> Self {
        Self { notification }
    }

    /// 作成された bloqueio を通知する
    #[tracing::instrument(skip_all, fields(numero = %bloqueio.numero))]
    pub async fn on_created(&self, bloqueio: Bloqueio) -> Result<DispatchOutcome, NotifierError> {
        match self.notification.dispatch(Report::NewBloqueio(bloqueio)).await {
            Err(NotifierError::Delivery(e)) => {
                tracing::warn!(error = %e, "新規 bloqueio の通知に失敗しました（トリガーは成功扱い）");
                Ok(DispatchOutcome::DeliveryFailed)
            }
            other => other,
        }
    }
}
