//! # 定期レポート
//!
//! 毎日決まった時刻に実行される 3 種類のレポートを組み立てて送信する。
//!
//! | ジョブ | 時刻 | 対象 | 宛先 |
//! |---|---|---|---|
//! | 期限到来 | 07:00 | `vencimento` が今日の bloqueio | admin / dev |
//! | 未対応エリア | 07:30 | 7 日以上前に起票され tratativa のない bloqueio | admin / dev |
//! | 日次サマリー | 18:00 | 今日の bloqueio / tratativa / finalização 件数 | admin |
//!
//! 「今日」は設定したタイムゾーンの暦日。実行は毎回クエリからやり直し、
//! 送信済みかどうかは記録しない（同じ日に再実行すれば再送される）。

use std::sync::Arc;

use bloqueio_domain::{
    backlog::{BACKLOG_AGE_DAYS, pending_by_area},
    calendar::ReportDate,
    notification::Report,
};
use bloqueio_infra::repository::{BloqueioRepository, FinalizacaoRepository, TratativaRepository};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::{DispatchOutcome, NotificationService};
use crate::{error::NotifierError, scheduler::ScheduledJob};

/// 定期レポートの実行者
pub struct ScheduledReportRunner {
    bloqueio_repo:    Arc<dyn BloqueioRepository>,
    tratativa_repo:   Arc<dyn TratativaRepository>,
    finalizacao_repo: Arc<dyn FinalizacaoRepository>,
    notification:     Arc<NotificationService>,
    timezone:         Tz,
}

impl ScheduledReportRunner {
    pub fn new(
        bloqueio_repo: Arc<dyn BloqueioRepository>,
        tratativa_repo: Arc<dyn TratativaRepository>,
        finalizacao_repo: Arc<dyn FinalizacaoRepository>,
        notification: Arc<NotificationService>,
        timezone: Tz,
    ) -> Self {
        Self {
            bloqueio_repo,
            tratativa_repo,
            finalizacao_repo,
            notification,
            timezone,
        }
    }

    /// ジョブを実行する
    pub async fn run(
        &self,
        job: ScheduledJob,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, NotifierError> {
        match job {
            ScheduledJob::Expiration => self.run_expiration(now).await,
            ScheduledJob::DailySummary => self.run_daily_summary(now).await,
            ScheduledJob::UntreatedBacklog => self.run_untreated_backlog(now).await,
        }
    }

    /// 期限到来レポート
    #[tracing::instrument(skip_all)]
    pub async fn run_expiration(&self, now: DateTime<Utc>) -> Result<DispatchOutcome, NotifierError> {
        let today = self.today(now);
        let items = self.bloqueio_repo.find_by_vencimento(&today).await?;

        tracing::debug!(date = %today, count = items.len(), "期限到来の bloqueio を取得");

        self.notification
            .dispatch(Report::Expiration { date: today, items })
            .await
    }

    /// 日次サマリー
    ///
    /// 3 つのコレクションを並行して読み、どれか 1 つでも失敗すれば全体を失敗とする。
    /// 件数がすべて 0 でも送信する。
    #[tracing::instrument(skip_all)]
    pub async fn run_daily_summary(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, NotifierError> {
        let today = self.today(now);

        let (bloqueios, tratativas, finalizacoes) = tokio::try_join!(
            self.bloqueio_repo.find_by_data_bloqueio(&today),
            self.tratativa_repo.find_by_data_liberacao(&today),
            self.finalizacao_repo.find_by_data_finalizacao(&today),
        )?;

        self.notification
            .dispatch(Report::DailySummary {
                date:         today,
                bloqueios:    bloqueios.len(),
                tratativas:   tratativas.len(),
                finalizacoes: finalizacoes.len(),
            })
            .await
    }

    /// 未対応エリアレポート
    ///
    /// tratativa は日付で絞らず全件を読む。
    #[tracing::instrument(skip_all)]
    pub async fn run_untreated_backlog(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, NotifierError> {
        let cutoff = self.today(now).days_before(BACKLOG_AGE_DAYS)?;

        let incidents = self.bloqueio_repo.find_opened_on_or_before(&cutoff).await?;
        let treatments = self.tratativa_repo.find_all().await?;
        let areas = pending_by_area(&incidents, &treatments);

        tracing::debug!(
            cutoff = %cutoff,
            incidents = incidents.len(),
            treatments = treatments.len(),
            areas = areas.len(),
            "未対応エリアを集計"
        );

        self.notification
            .dispatch(Report::UntreatedBacklog { cutoff, areas })
            .await
    }

    fn today(&self, now: DateTime<Utc>) -> ReportDate {
        ReportDate::today(now, self.timezone)
    }
}
