//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use bloqueio_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// SES 通知送信
///
/// `aws_sdk_sesv2::Client` をラップする。
/// 宛先ごとに `SendEmail` を 1 回呼び出す（受信者同士のアドレスを見せない）。
pub struct SesNotificationSender {
    client:       Client,
    from_address: String,
}

impl SesNotificationSender {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    pub fn new(client: Client, from_address: String) -> Self {
        Self {
            client,
            from_address,
        }
    }

    fn content(email: &EmailMessage) -> Result<EmailContent, NotificationError> {
        let subject = Content::builder()
            .data(&email.subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| NotificationError::SendFailed(format!("件名構築失敗: {e}")))?;
        let html = Content::builder()
            .data(&email.html_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| NotificationError::SendFailed(format!("HTML 本文構築失敗: {e}")))?;
        let text = Content::builder()
            .data(&email.text_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| NotificationError::SendFailed(format!("テキスト本文構築失敗: {e}")))?;

        Ok(EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(subject)
                    .body(Body::builder().html(html).text(text).build())
                    .build(),
            )
            .build())
    }
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let content = Self::content(email)?;

        for to in &email.to {
            self.client
                .send_email()
                .from_email_address(&self.from_address)
                .destination(Destination::builder().to_addresses(to).build())
                .content(content.clone())
                .send()
                .await
                .map_err(|e| NotificationError::SendFailed(format!("SES 送信失敗 ({to}): {e}")))?;
        }

        Ok(())
    }
}
