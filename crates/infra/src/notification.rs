//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **4 つの実装**: SendGrid（本番用）、SES、SMTP（Mailpit 開発用）、Noop
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **宛先ごとに個別配送**: 1 通のメッセージに複数の宛先があっても、
//!   受信者には自分のアドレスだけが見える
//!
//! ## 配信認証情報
//!
//! SendGrid の API キーが設定されていない場合（[`DeliveryCredential::Unconfigured`]）は
//! 送信せずに警告ログを出す Noop 実装にフォールバックする。

mod noop;
mod sendgrid;
mod ses;
mod smtp;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use bloqueio_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use sendgrid::SendGridNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;

/// 送信元アドレスの既定値
pub const DEFAULT_FROM_ADDRESS: &str = "no-reply@example.com";

/// SendGrid API の既定のベース URL
pub const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// `email.to` の全宛先に配送できた場合のみ `Ok` を返す。
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}

/// 通知バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    SendGrid,
    Ses,
    Smtp,
    Noop,
}

impl NotificationBackend {
    /// `NOTIFICATION_BACKEND` の値から変換する
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sendgrid" => Some(Self::SendGrid),
            "ses" => Some(Self::Ses),
            "smtp" => Some(Self::Smtp),
            "noop" => Some(Self::Noop),
            _ => None,
        }
    }
}

/// SendGrid の配信認証情報
#[derive(Clone, PartialEq, Eq)]
pub enum DeliveryCredential {
    /// API キーが設定されている
    Configured { api_key: String },
    /// API キー未設定（送信は警告ログのみの no-op になる）
    Unconfigured,
}

impl DeliveryCredential {
    /// API キーの有無から認証情報を組み立てる
    ///
    /// 空文字（前後の空白のみを含む）の API キーは未設定として扱う。
    pub fn new(api_key: Option<String>) -> Self {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(api_key) => Self::Configured { api_key },
            None => Self::Unconfigured,
        }
    }
}

// API キーをログに出さない
impl fmt::Debug for DeliveryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured { .. } => f
                .debug_struct("Configured")
                .field("api_key", &"***")
                .finish(),
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

/// 通知送信の設定
///
/// 送信元アドレスはすべてのバックエンドで共通の `from_address` を使う。
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:          NotificationBackend,
    pub from_address:     String,
    pub credential:       DeliveryCredential,
    pub sendgrid_api_url: String,
    pub smtp_host:        String,
    pub smtp_port:        u16,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            backend:          NotificationBackend::SendGrid,
            from_address:     DEFAULT_FROM_ADDRESS.to_string(),
            credential:       DeliveryCredential::Unconfigured,
            sendgrid_api_url: DEFAULT_SENDGRID_API_URL.to_string(),
            smtp_host:        "localhost".to_string(),
            smtp_port:        1025,
        }
    }
}

/// 設定に応じた NotificationSender を生成する
///
/// SES は AWS のデフォルト認証情報チェーンを読み込むため非同期。
pub async fn build_sender(config: &NotificationConfig) -> Arc<dyn NotificationSender> {
    match config.backend {
        NotificationBackend::SendGrid => match &config.credential {
            DeliveryCredential::Configured { api_key } => {
                tracing::info!("通知バックエンド: SendGrid");
                Arc::new(SendGridNotificationSender::new(
                    &config.sendgrid_api_url,
                    api_key.clone(),
                    config.from_address.clone(),
                ))
            }
            DeliveryCredential::Unconfigured => {
                tracing::warn!("SENDGRID_API_KEY が未設定のため、メールは送信されません");
                Arc::new(NoopNotificationSender::unconfigured())
            }
        },
        NotificationBackend::Ses => {
            tracing::info!("通知バックエンド: SES");
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Arc::new(SesNotificationSender::new(
                aws_sdk_sesv2::Client::new(&aws_config),
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Smtp => {
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                "通知バックエンド: SMTP"
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Noop => {
            tracing::info!("通知バックエンド: Noop");
            Arc::new(NoopNotificationSender::new())
        }
    }
}
