//! # Bloqueio Notifier サーバー
//!
//! bloqueio（ロックアウト）管理の通知サービス。
//!
//! ## 役割
//!
//! - **作成トリガー**: 新しい bloqueio の登録イベントを受けて admin / dev に即時通知
//! - **定期レポート**: 期限到来（07:00）、未対応エリア（07:30）、日次サマリー（18:00）
//!
//! 時刻はすべて `NOTIFIER_TIMEZONE`（既定: `America/Sao_Paulo`）の壁時計で判定する。
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ レコード作成 │────▶│   Notifier   │────▶│   SendGrid   │
//! │ / スケジューラ│     │              │     └──────────────┘
//! └──────────────┘     └──────┬───────┘
//!                             │ Scan
//!                             ▼
//!                      ┌──────────────┐
//!                      │   DynamoDB   │
//!                      └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! 主要なもののみ。一覧は [`bloqueio_notifier::config`] を参照。
//!
//! | 変数名 | 既定値 | 説明 |
//! |--------|--------|------|
//! | `NOTIFIER_PORT` | `13010` | ポート番号 |
//! | `SENDGRID_API_KEY` | なし | 未設定なら送信せず警告ログのみ |
//! | `SCHEDULER_ENABLED` | `true` | プロセス内スケジューラを起動するか |
//! | `DYNAMODB_ENDPOINT` | なし | DynamoDB Local のエンドポイント |

use std::{net::SocketAddr, sync::Arc};

use bloqueio_domain::clock::{Clock, SystemClock};
use bloqueio_infra::{
   dynamodb,
   notification::build_sender,
   repository::{
      DynamoDbBloqueioRepository,
      DynamoDbFinalizacaoRepository,
      DynamoDbSubscriberRepository,
      DynamoDbTratativaRepository,
   },
};
use bloqueio_notifier::{
   config::NotifierConfig,
   handler::{self, JobState, TriggerState},
   scheduler::Scheduler,
   usecase::{
      BloqueioTrigger,
      NotificationService,
      RecipientDirectory,
      ScheduledReportRunner,
      TemplateRenderer,
   },
};
use bloqueio_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Notifier サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   // トレーシング初期化
   init_tracing(TracingConfig::from_env("bloqueio-notifier"));

   // 設定読み込み
   let config = NotifierConfig::from_env()?;

   tracing::info!(
      timezone = %config.timezone,
      scheduler_enabled = config.scheduler_enabled,
      "Notifier サーバーを起動します: {}:{}",
      config.host,
      config.port
   );

   // DynamoDB クライアントを作成
   let client = dynamodb::create_client(config.dynamodb_endpoint.as_deref()).await;
   if config.ensure_tables {
      let collections = &config.collections;
      for table in [
         &collections.subscribers,
         &collections.bloqueios,
         &collections.tratativas,
         &collections.finalizacoes,
      ] {
         dynamodb::ensure_collection_table(&client, table).await?;
      }
   }
   tracing::info!("DynamoDB に接続しました");

   // 依存コンポーネントを初期化
   let subscriber_repo = Arc::new(DynamoDbSubscriberRepository::new(
      client.clone(),
      config.collections.subscribers.clone(),
   ));
   let bloqueio_repo = Arc::new(DynamoDbBloqueioRepository::new(
      client.clone(),
      config.collections.bloqueios.clone(),
   ));
   let tratativa_repo = Arc::new(DynamoDbTratativaRepository::new(
      client.clone(),
      config.collections.tratativas.clone(),
   ));
   let finalizacao_repo = Arc::new(DynamoDbFinalizacaoRepository::new(
      client,
      config.collections.finalizacoes.clone(),
   ));

   let sender = build_sender(&config.notification).await;
   let notification = Arc::new(NotificationService::new(
      RecipientDirectory::new(subscriber_repo),
      sender,
      TemplateRenderer::new()?,
   ));

   let runner = Arc::new(ScheduledReportRunner::new(
      bloqueio_repo,
      tratativa_repo,
      finalizacao_repo,
      notification.clone(),
      config.timezone,
   ));
   let clock: Arc<dyn Clock> = Arc::new(SystemClock);

   // スケジューラ起動
   let _scheduled_jobs = if config.scheduler_enabled {
      tracing::info!("スケジューラを起動します");
      Scheduler::new(runner.clone(), clock.clone(), config.timezone).spawn()
   } else {
      tracing::info!("スケジューラは無効です（外部から /internal/jobs を呼び出してください）");
      Vec::new()
   };

   // ルーター構築
   let app = handler::router(
      Arc::new(TriggerState {
         trigger: BloqueioTrigger::new(notification),
      }),
      Arc::new(JobState { runner, clock }),
   )
   .layer(TraceLayer::new_for_http());

   // サーバー起動
   let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("Notifier サーバーが起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
