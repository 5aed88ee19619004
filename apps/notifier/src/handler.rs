//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ロジックはユースケースに委譲
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 用途 |
//! |---|---|---|
//! | GET | `/health` | 死活確認 |
//! | POST | `/internal/triggers/bloqueios` | bloqueio 作成イベント |
//! | POST | `/internal/jobs/{job}` | 定期ジョブの手動・外部実行 |

pub mod health;
pub mod job;
pub mod trigger;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
pub use health::health_check;
pub use job::{JobRunDto, JobState, run_job};
pub use trigger::{DispatchOutcomeDto, TriggerState, handle_bloqueio_created};

/// ルーターを構築する
///
/// トレースレイヤーは呼び出し側（`main`）で付与する。
pub fn router(trigger_state: Arc<TriggerState>, job_state: Arc<JobState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/internal/triggers/bloqueios", post(handle_bloqueio_created))
        .with_state(trigger_state)
        .route("/internal/jobs/{job}", post(run_job))
        .with_state(job_state)
}
