//! # 定期実行スケジューラ
//!
//! 3 つの定期レポートを固定タイムゾーンの壁時計時刻で起動する。
//!
//! ## 設計方針
//!
//! - **ジョブごとに 1 タスク**: 各ジョブは独立して眠り、起き、実行する
//! - **次回時刻は純粋関数**: [`ScheduledJob::next_run_after`] は `now` だけで決まる
//! - **失敗してもループは止めない**: 失敗はログに残し、翌日の実行を待つ（再試行しない）
//!
//! 外部のスケジューラから `POST /internal/jobs/{job}` を呼ぶ運用では
//! `SCHEDULER_ENABLED=false` で無効化する。

use std::sync::Arc;

use bloqueio_domain::{clock::Clock, notification::ReportKind};
use bloqueio_shared::{event_log::event, log_business_event};
use chrono::{DateTime, Days, TimeZone, Utc};
use chrono_tz::Tz;
use strum::IntoStaticStr;
use tokio::task::JoinHandle;

use crate::usecase::ScheduledReportRunner;

/// 次回時刻を探す日数の上限
///
/// 夏時間で消える時刻が何日も続くことはないため、数日以内に必ず見つかる。
const MAX_LOOKAHEAD_DAYS: u64 = 7;

/// 定期ジョブ
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ScheduledJob {
    /// 期限到来（07:00）
    Expiration,
    /// 日次サマリー（18:00）
    DailySummary,
    /// 未対応エリア（07:30）
    UntreatedBacklog,
}

impl ScheduledJob {
    /// 全ジョブ
    pub const ALL: [ScheduledJob; 3] = [
        ScheduledJob::Expiration,
        ScheduledJob::DailySummary,
        ScheduledJob::UntreatedBacklog,
    ];

    /// 実行時刻（時, 分）
    pub fn time_of_day(&self) -> (u32, u32) {
        match self {
            Self::Expiration => (7, 0),
            Self::DailySummary => (18, 0),
            Self::UntreatedBacklog => (7, 30),
        }
    }

    /// このジョブが送るレポート種別
    pub fn report_kind(&self) -> ReportKind {
        match self {
            Self::Expiration => ReportKind::Expiration,
            Self::DailySummary => ReportKind::DailySummary,
            Self::UntreatedBacklog => ReportKind::UntreatedBacklog,
        }
    }

    /// `now` より厳密に後の次回実行時刻
    ///
    /// 夏時間の切り替えで存在しない時刻は翌日に回し、
    /// 2 回現れる時刻は早い方を採用する。
    pub fn next_run_after(&self, now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let (hour, minute) = self.time_of_day();
        next_wall_clock_time(hour, minute, now, tz)
            .unwrap_or_else(|| now + chrono::Duration::days(1))
    }
}

/// `tz` の壁時計で `hour:minute` となる、`now` より後の最初の時刻
fn next_wall_clock_time(hour: u32, minute: u32, now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let local_today = now.with_timezone(&tz).date_naive();

    (0..=MAX_LOOKAHEAD_DAYS)
        .filter_map(|offset| local_today.checked_add_days(Days::new(offset)))
        .filter_map(|date| date.and_hms_opt(hour, minute, 0))
        .filter_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|at| at.with_timezone(&Utc))
        .find(|at| *at > now)
}

/// 定期実行スケジューラ
pub struct Scheduler {
    runner:   Arc<ScheduledReportRunner>,
    clock:    Arc<dyn Clock>,
    timezone: Tz,
}

impl Scheduler {
    pub fn new(runner: Arc<ScheduledReportRunner>, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self {
            runner,
            clock,
            timezone,
        }
    }

    /// ジョブごとにバックグラウンドタスクを起動する
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        ScheduledJob::ALL
            .into_iter()
            .map(|job| {
                let runner = self.runner.clone();
                let clock = self.clock.clone();
                let timezone = self.timezone;
                tokio::spawn(async move {
                    run_loop(job, runner, clock, timezone).await;
                })
            })
            .collect()
    }
}

async fn run_loop(
    job: ScheduledJob,
    runner: Arc<ScheduledReportRunner>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
) {
    let mut after = clock.now();

    loop {
        let next = job.next_run_after(after, timezone);
        tracing::info!(job = %job, next_run = %next, "次回実行をスケジュール");

        let wait = (next - clock.now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        // タイマーが早く起きても同じ時刻を二重に実行しない
        execute(job, &runner, next).await;
        after = next.max(clock.now());
    }
}

/// ジョブを 1 回実行し、結果をログに残す
///
/// 失敗は呼び出し元に返さない。
pub async fn execute(job: ScheduledJob, runner: &ScheduledReportRunner, at: DateTime<Utc>) {
    let job_name: &str = job.into();
    let report_kind: &str = job.report_kind().into();

    match runner.run(job, at).await {
        Ok(outcome) => {
            log_business_event!(
                event.category = event::category::SCHEDULER,
                event.action = event::action::JOB_COMPLETED,
                event.result = event::result::SUCCESS,
                job.name = job_name,
                report.kind = report_kind,
                job.outcome = outcome.status(),
                notification.recipients = outcome.recipients(),
                "定期ジョブ完了"
            );
        }
        Err(e) => {
            log_business_event!(
                event.category = event::category::SCHEDULER,
                event.action = event::action::JOB_FAILED,
                event.result = event::result::FAILURE,
                job.name = job_name,
                report.kind = report_kind,
                error = %e,
                "定期ジョブ失敗"
            );
        }
    }
}
