//! # 定期ジョブハンドラ
//!
//! 定期レポートを即時実行する。外部のスケジューラや運用者の手動再実行に使う。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /internal/jobs/{job}
//! ```
//!
//! `job` は `expiration` / `daily-summary` / `untreated-backlog`。
//! 未知のジョブ名は `404`、読み取りや送信の失敗は `500`。

use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bloqueio_domain::clock::Clock;
use bloqueio_shared::ApiResponse;
use serde::Serialize;

use super::DispatchOutcomeDto;
use crate::{error::NotifierError, scheduler::ScheduledJob, usecase::ScheduledReportRunner};

/// ジョブハンドラーの State
pub struct JobState {
    pub runner: Arc<ScheduledReportRunner>,
    pub clock:  Arc<dyn Clock>,
}

/// ジョブ実行結果 DTO
#[derive(Debug, Serialize)]
pub struct JobRunDto {
    pub job:     &'static str,
    #[serde(flatten)]
    pub outcome: DispatchOutcomeDto,
}

/// 定期ジョブを実行する
#[tracing::instrument(skip_all)]
pub async fn run_job(
    State(state): State<Arc<JobState>>,
    Path(job): Path<String>,
) -> Result<Response, NotifierError> {
    let job = ScheduledJob::from_str(&job)
        .map_err(|_| NotifierError::NotFound(format!("ジョブが存在しません: {job}")))?;

    let outcome = state.runner.run(job, state.clock.now()).await?;

    let response = ApiResponse::new(JobRunDto {
        job:     job.into(),
        outcome: DispatchOutcomeDto::from(outcome),
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}
