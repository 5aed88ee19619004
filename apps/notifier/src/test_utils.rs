//! # テストユーティリティ
//!
//! インメモリモックで通知サービス一式を組み立てるハーネス。
//! ハンドラテストと `tests/` の統合テストで共有する。

use std::sync::Arc;

use axum::Router;
use bloqueio_domain::{
    clock::FixedClock,
    subscriber::{Subscriber, SubscriberRole},
};
use bloqueio_infra::mock::{
    MockBloqueioRepository,
    MockFinalizacaoRepository,
    MockNotificationSender,
    MockSubscriberRepository,
    MockTratativaRepository,
};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::{America::Sao_Paulo, Tz};

use crate::{
    handler::{self, JobState, TriggerState},
    usecase::{
        BloqueioTrigger,
        NotificationService,
        RecipientDirectory,
        ScheduledReportRunner,
        TemplateRenderer,
    },
};

/// モック一式と固定時刻
///
/// モックは `Clone` で状態を共有するため、組み立て後もデータ投入・
/// 送信記録の確認ができる。
#[derive(Clone)]
pub struct TestHarness {
    pub subscribers:  MockSubscriberRepository,
    pub bloqueios:    MockBloqueioRepository,
    pub tratativas:   MockTratativaRepository,
    pub finalizacoes: MockFinalizacaoRepository,
    pub sender:       MockNotificationSender,
    pub now:          DateTime<Utc>,
    pub timezone:     Tz,
}

impl TestHarness {
    /// サンパウロ時間で指定した日時を「現在」とするハーネス
    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Self {
        let now = Sao_Paulo
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc);

        Self {
            subscribers: MockSubscriberRepository::new(),
            bloqueios: MockBloqueioRepository::new(),
            tratativas: MockTratativaRepository::new(),
            finalizacoes: MockFinalizacaoRepository::new(),
            sender: MockNotificationSender::new(),
            now,
            timezone: Sao_Paulo,
        }
    }

    /// 購読者を追加する
    pub fn with_subscriber(self, email: &str, role: SubscriberRole) -> Self {
        self.subscribers.add_subscriber(Subscriber::new(email, role));
        self
    }

    pub fn notification_service(&self) -> Arc<NotificationService> {
        Arc::new(NotificationService::new(
            RecipientDirectory::new(Arc::new(self.subscribers.clone())),
            Arc::new(self.sender.clone()),
            TemplateRenderer::new().unwrap(),
        ))
    }

    pub fn trigger(&self) -> BloqueioTrigger {
        BloqueioTrigger::new(self.notification_service())
    }

    pub fn runner(&self) -> Arc<ScheduledReportRunner> {
        Arc::new(ScheduledReportRunner::new(
            Arc::new(self.bloqueios.clone()),
            Arc::new(self.tratativas.clone()),
            Arc::new(self.finalizacoes.clone()),
            self.notification_service(),
            self.timezone,
        ))
    }

    /// 本番と同じルーティングのアプリケーション
    pub fn router(&self) -> Router {
        handler::router(
            Arc::new(TriggerState {
                trigger: self.trigger(),
            }),
            Arc::new(JobState {
                runner: self.runner(),
                clock:  Arc::new(FixedClock::new(self.now)),
            }),
        )
    }
}
