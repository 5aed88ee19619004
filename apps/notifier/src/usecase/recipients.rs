//! # 宛先ディレクトリ
//!
//! 購読者コレクションを読み、ロールで絞り込んだメールアドレスを返す。

use std::sync::Arc;

use bloqueio_domain::subscriber::{SubscriberRole, select_emails};
use bloqueio_infra::repository::SubscriberRepository;

use crate::error::NotifierError;

/// 宛先ディレクトリ
#[derive(Clone)]
pub struct RecipientDirectory {
    subscriber_repo: Arc<dyn SubscriberRepository>,
}

impl RecipientDirectory {
    pub fn new(subscriber_repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { subscriber_repo }
    }

    /// ロールに該当する購読者のメールアドレスを返す
    ///
    /// `roles` が `None` なら全員。順序はコレクションの格納順で、
    /// 呼び出し側は順序に依存しないこと。該当者がいなくてもエラーにはしない。
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn get_emails(
        &self,
        roles: Option<&[SubscriberRole]>,
    ) -> Result<Vec<String>, NotifierError> {
        let subscribers = self.subscriber_repo.find_all().await?;
        Ok(select_emails(&subscribers, roles))
    }
}
