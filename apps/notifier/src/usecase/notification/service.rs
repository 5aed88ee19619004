//! # 通知サービス
//!
//! 宛先解決 → テンプレートレンダリング → メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **送らない条件を先に判定**: 行のないレポートは宛先も読まずに終了し、
//!   宛先が 0 件ならメールを組み立てない
//! - **再送しない**: 送信失敗はそのまま呼び出し元に返す
//! - **重複抑止しない**: 同じ日に同じレポートを再実行すれば再送される

use std::sync::Arc;

use bloqueio_domain::notification::Report;
use bloqueio_infra::notification::NotificationSender;
use bloqueio_shared::{event_log::event, log_business_event};

use super::TemplateRenderer;
use crate::{error::NotifierError, usecase::RecipientDirectory};

/// 1 回の通知処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 送信した
    Sent { recipients: usize },
    /// 宛先がいないため送信しなかった
    NoRecipients,
    /// レポートに行がないため送信しなかった
    EmptyReport,
    /// 送信に失敗したが、呼び出し元には成功として応答した
    DeliveryFailed,
}

impl DispatchOutcome {
    /// ログ・レスポンス用の状態名
    pub fn status(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "sent",
            Self::NoRecipients => "no_recipients",
            Self::EmptyReport => "empty_report",
            Self::DeliveryFailed => "delivery_failed",
        }
    }

    /// 送信した宛先数
    pub fn recipients(&self) -> usize {
        match self {
            Self::Sent { recipients } => *recipients,
            _ => 0,
        }
    }
}

/// 通知サービス
pub struct NotificationService {
    recipients:        RecipientDirectory,
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
}

impl NotificationService {
    pub fn new(
        recipients: RecipientDirectory,
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
    ) -> Self {
        Self {
            recipients,
            sender,
            template_renderer,
        }
    }

    /// レポートを宛先ロールの購読者に送信する
    ///
    /// 宛先は `report.kind().allowed_roles()` で決まる。
    #[tracing::instrument(skip_all, fields(report.kind = %report.kind()))]
    pub async fn dispatch(&self, report: Report) -> Result<DispatchOutcome, NotifierError> {
        let kind: &str = report.kind().into();

        if report.is_empty() {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SKIPPED,
                event.result = event::result::SKIPPED,
                report.kind = kind,
                reason = "empty_report",
                "レポートの対象がないため送信しません"
            );
            return Ok(DispatchOutcome::EmptyReport);
        }

        let recipients = self
            .recipients
            .get_emails(Some(report.kind().allowed_roles()))
            .await?;

        if recipients.is_empty() {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SKIPPED,
                event.result = event::result::SKIPPED,
                report.kind = kind,
                reason = "no_recipients",
                "宛先がいないため送信しません"
            );
            return Ok(DispatchOutcome::NoRecipients);
        }

        let recipient_count = recipients.len();
        let email = self.template_renderer.render(&report, recipients)?;

        match self.sender.send_email(&email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    report.kind = kind,
                    notification.recipients = recipient_count,
                    notification.subject = %email.subject,
                    "通知メール送信成功"
                );
                Ok(DispatchOutcome::Sent {
                    recipients: recipient_count,
                })
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    report.kind = kind,
                    notification.recipients = recipient_count,
                    error = %e,
                    "通知メール送信失敗"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bloqueio_domain::{
        calendar::ReportDate,
        incident::{Bloqueio, IncidentNumber},
        subscriber::{Subscriber, SubscriberRole},
    };
    use bloqueio_infra::mock::{MockNotificationSender, MockSubscriberRepository};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_service(
        subscribers: MockSubscriberRepository,
        sender: MockNotificationSender,
    ) -> NotificationService {
        NotificationService::new(
            RecipientDirectory::new(Arc::new(subscribers)),
            Arc::new(sender),
            TemplateRenderer::new().unwrap(),
        )
    }

    fn subscribers() -> MockSubscriberRepository {
        let repo = MockSubscriberRepository::new();
        repo.add_subscriber(Subscriber::new("ana@example.com", SubscriberRole::Admin));
        repo.add_subscriber(Subscriber::new("bruno@example.com", SubscriberRole::Dev));
        repo
    }

    fn new_bloqueio() -> Report {
        Report::NewBloqueio(Bloqueio {
            numero: IncidentNumber::from(7),
            problema: Some("Selo vencido".to_string()),
            ..Default::default()
        })
    }

    fn today() -> ReportDate {
        ReportDate::from_naive(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[tokio::test]
    async fn 許可ロールの全員に1通で送信する() {
        let sender = MockNotificationSender::new();
        let service = make_service(subscribers(), sender.clone());

        let outcome = service.dispatch(new_bloqueio()).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent { recipients: 2 });
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].to,
            vec!["ana@example.com".to_string(), "bruno@example.com".to_string()]
        );
        assert_eq!(sent[0].subject, "Novo Bloqueio #7 (Selo vencido)");
    }

    #[tokio::test]
    async fn 日次サマリーはadminだけに送る() {
        let sender = MockNotificationSender::new();
        let service = make_service(subscribers(), sender.clone());
        let report = Report::DailySummary {
            date:         today(),
            bloqueios:    0,
            tratativas:   0,
            finalizacoes: 0,
        };

        let outcome = service.dispatch(report).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent { recipients: 1 });
        assert_eq!(sender.sent_emails()[0].to, vec!["ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn 宛先がいなければ送信しない() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockSubscriberRepository::new(), sender.clone());

        let outcome = service.dispatch(new_bloqueio()).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::NoRecipients);
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn 行のないレポートは宛先を読まずに終了する() {
        let sender = MockNotificationSender::new();
        let subscribers = subscribers();
        subscribers.fail_with("読まれないはず");
        let service = make_service(subscribers, sender.clone());
        let report = Report::Expiration {
            date:  today(),
            items: vec![],
        };

        let outcome = service.dispatch(report).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::EmptyReport);
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn 送信失敗はdeliveryエラーとして返す() {
        let sender = MockNotificationSender::new();
        sender.fail_with("SendGrid 503");
        let service = make_service(subscribers(), sender);

        let result = service.dispatch(new_bloqueio()).await;

        assert!(matches!(result, Err(NotifierError::Delivery(_))));
    }
}
