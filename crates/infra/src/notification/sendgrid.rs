//! SendGrid 通知送信実装
//!
//! SendGrid v3 Mail Send API（`POST /v3/mail/send`）を reqwest で呼び出す。
//! 宛先ごとに `personalizations` を 1 件ずつ作成するため、1 回の API 呼び出しで
//! 全員に個別のメールとして配送される。

use async_trait::async_trait;
use bloqueio_domain::notification::{EmailMessage, NotificationError};
use serde::Serialize;

use super::NotificationSender;

/// SendGrid 通知送信
pub struct SendGridNotificationSender {
    client:       reqwest::Client,
    endpoint:     String,
    api_key:      String,
    from_address: String,
}

impl SendGridNotificationSender {
    /// 新しい SendGrid 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `https://api.sendgrid.com`）
    /// - `api_key`: SendGrid API キー
    /// - `from_address`: 送信元メールアドレス（SendGrid で認証済みであること）
    pub fn new(base_url: &str, api_key: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/v3/mail/send", base_url.trim_end_matches('/')),
            api_key,
            from_address,
        }
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from:             Address<'a>,
    subject:          &'a str,
    content:          [Content<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value:        &'a str,
}

impl<'a> MailSendRequest<'a> {
    fn new(from_address: &'a str, email: &'a EmailMessage) -> Self {
        Self {
            personalizations: email
                .to
                .iter()
                .map(|to| Personalization {
                    to: [Address { email: to }],
                })
                .collect(),
            from:             Address {
                email: from_address,
            },
            subject:          &email.subject,
            // text/plain は text/html より前に置く必要がある
            content:          [
                Content {
                    content_type: "text/plain",
                    value:        &email.text_body,
                },
                Content {
                    content_type: "text/html",
                    value:        &email.html_body,
                },
            ],
        }
    }
}

#[async_trait]
impl NotificationSender for SendGridNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        if email.to.is_empty() {
            return Ok(());
        }

        let body = MailSendRequest::new(&self.from_address, email);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SendGrid 接続失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed(format!(
                "SendGrid 送信失敗 ({status}): {detail}"
            )));
        }

        tracing::debug!(recipients = email.to.len(), %status, "SendGrid 送信完了");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        Mock,
        MockServer,
        ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use super::*;

    fn email(to: &[&str]) -> EmailMessage {
        EmailMessage {
            to:        to.iter().map(|s| s.to_string()).collect(),
            subject:   "Novo Bloqueio #7 (Selo vencido)".to_string(),
            html_body: "<h3>Novo Bloqueio</h3>".to_string(),
            text_body: "Novo Bloqueio".to_string(),
        }
    }

    #[test]
    fn 宛先ごとにpersonalizationを作成する() {
        let email = email(&["ana@example.com", "bruno@example.com"]);
        let body = serde_json::to_value(MailSendRequest::new("no-reply@example.com", &email)).unwrap();

        assert_eq!(
            body,
            json!({
                "personalizations": [
                    {"to": [{"email": "ana@example.com"}]},
                    {"to": [{"email": "bruno@example.com"}]},
                ],
                "from": {"email": "no-reply@example.com"},
                "subject": "Novo Bloqueio #7 (Selo vencido)",
                "content": [
                    {"type": "text/plain", "value": "Novo Bloqueio"},
                    {"type": "text/html", "value": "<h3>Novo Bloqueio</h3>"},
                ],
            })
        );
    }

    #[tokio::test]
    async fn apiキーをbearerで送信し202で成功する() {
        let server = MockServer::start().await;
        let email = email(&["ana@example.com"]);

        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("authorization", "Bearer SG.test"))
            .and(body_json(json!({
                "personalizations": [{"to": [{"email": "ana@example.com"}]}],
                "from": {"email": "no-reply@example.com"},
                "subject": "Novo Bloqueio #7 (Selo vencido)",
                "content": [
                    {"type": "text/plain", "value": "Novo Bloqueio"},
                    {"type": "text/html", "value": "<h3>Novo Bloqueio</h3>"},
                ],
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let sender = SendGridNotificationSender::new(
            &server.uri(),
            "SG.test".to_string(),
            "no-reply@example.com".to_string(),
        );

        assert!(sender.send_email(&email).await.is_ok());
    }

    #[tokio::test]
    async fn エラーレスポンスはsend_failedになる() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let sender = SendGridNotificationSender::new(
            &format!("{}/", server.uri()),
            "SG.invalid".to_string(),
            "no-reply@example.com".to_string(),
        );

        let result = sender.send_email(&email(&["ana@example.com"])).await;

        match result {
            Err(NotificationError::SendFailed(msg)) => {
                assert!(msg.contains("401"), "{msg}");
                assert!(msg.contains("Unauthorized"), "{msg}");
            }
            other => panic!("SendFailed を期待: {other:?}"),
        }
    }

    #[tokio::test]
    async fn 宛先がなければapiを呼び出さない() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let sender = SendGridNotificationSender::new(
            &server.uri(),
            "SG.test".to_string(),
            "no-reply@example.com".to_string(),
        );

        assert!(sender.send_email(&email(&[])).await.is_ok());
    }
}
