//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 通知無効化時と、配信認証情報が未設定のときに使用する。

use async_trait::async_trait;
use bloqueio_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationSender {
    /// 認証情報の未設定によるフォールバックかどうか
    unconfigured: bool,
}

impl NoopNotificationSender {
    /// 明示的に通知を無効化した送信者
    pub fn new() -> Self {
        Self::default()
    }

    /// 配信認証情報が未設定のときの送信者（送信のたびに警告する）
    pub fn unconfigured() -> Self {
        Self { unconfigured: true }
    }
}

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        if self.unconfigured {
            tracing::warn!(
                recipients = email.to.len(),
                subject = %email.subject,
                "配信認証情報が未設定のため、メール送信をスキップ"
            );
        } else {
            tracing::info!(
                recipients = email.to.len(),
                subject = %email.subject,
                "Noop: メール送信をスキップ"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> EmailMessage {
        EmailMessage {
            to:        vec!["test@example.com".to_string()],
            subject:   "テスト件名".to_string(),
            html_body: "<p>テスト</p>".to_string(),
            text_body: "テスト".to_string(),
        }
    }

    #[tokio::test]
    async fn send_emailがエラーを返さない() {
        assert!(NoopNotificationSender::new().send_email(&email()).await.is_ok());
    }

    #[tokio::test]
    async fn 未設定フォールバックもエラーを返さない() {
        assert!(
            NoopNotificationSender::unconfigured()
                .send_email(&email())
                .await
                .is_ok()
        );
    }
}
