//! # Notifier 設定
//!
//! 環境変数から通知サービスの設定を読み込む。
//!
//! 値の解釈は [`NotifierConfig::from_lookup`] に集約しており、
//! テストでは環境変数を書き換えずに任意の値を与えられる。

use std::env;

use bloqueio_domain::calendar::parse_timezone;
use bloqueio_infra::notification::{
    DEFAULT_FROM_ADDRESS,
    DEFAULT_SENDGRID_API_URL,
    DeliveryCredential,
    NotificationBackend,
    NotificationConfig,
};
use chrono_tz::Tz;
use thiserror::Error;

/// 既定のタイムゾーン（スケジュールとレポート対象日の基準）
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// 設定エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} は有効なポート番号である必要があります: {value}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} は true / false で指定してください: {value}")]
    InvalidFlag { name: &'static str, value: String },

    #[error("NOTIFIER_TIMEZONE が不正です: {0}")]
    InvalidTimezone(String),

    #[error("NOTIFICATION_BACKEND が不正です（sendgrid | ses | smtp | noop）: {0}")]
    InvalidBackend(String),
}

/// コレクション（テーブル）名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    pub subscribers:  String,
    pub bloqueios:    String,
    pub tratativas:   String,
    pub finalizacoes: String,
}

/// 通知サービスの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// スケジュール実行・レポート対象日のタイムゾーン
    pub timezone: Tz,
    /// プロセス内スケジューラを起動するか
    pub scheduler_enabled: bool,
    /// DynamoDB エンドポイント（DynamoDB Local 使用時に設定）
    pub dynamodb_endpoint: Option<String>,
    /// 起動時に不足しているテーブルを作成するか
    pub ensure_tables: bool,
    /// コレクション名
    pub collections: CollectionNames,
    /// 通知設定
    pub notification: NotificationConfig,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字（空白のみを含む）の値は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let timezone_name = get_or("NOTIFIER_TIMEZONE", DEFAULT_TIMEZONE);
        let timezone = parse_timezone(timezone_name.trim())
            .map_err(|_| ConfigError::InvalidTimezone(timezone_name.clone()))?;

        let backend_name = get_or("NOTIFICATION_BACKEND", "sendgrid");
        let backend = NotificationBackend::parse(&backend_name)
            .ok_or(ConfigError::InvalidBackend(backend_name))?;

        Ok(Self {
            host: get_or("NOTIFIER_HOST", "0.0.0.0"),
            port: parse_port("NOTIFIER_PORT", get("NOTIFIER_PORT"), 13010)?,
            timezone,
            scheduler_enabled: parse_flag("SCHEDULER_ENABLED", get("SCHEDULER_ENABLED"), true)?,
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            ensure_tables: parse_flag(
                "DYNAMODB_ENSURE_TABLES",
                get("DYNAMODB_ENSURE_TABLES"),
                false,
            )?,
            collections: CollectionNames {
                subscribers:  get_or("COLLECTION_SUBSCRIBERS", "emails"),
                bloqueios:    get_or("COLLECTION_BLOQUEIOS", "bloqueios"),
                tratativas:   get_or("COLLECTION_TRATATIVAS", "tratativas"),
                finalizacoes: get_or("COLLECTION_FINALIZACOES", "finalizacoes"),
            },
            notification: NotificationConfig {
                backend,
                from_address: get_or("NOTIFICATION_FROM_ADDRESS", DEFAULT_FROM_ADDRESS),
                credential: DeliveryCredential::new(get("SENDGRID_API_KEY")),
                sendgrid_api_url: get_or("SENDGRID_API_URL", DEFAULT_SENDGRID_API_URL),
                smtp_host: get_or("SMTP_HOST", "localhost"),
                smtp_port: parse_port("SMTP_PORT", get("SMTP_PORT"), 1025)?,
            },
        })
    }
}

fn parse_port(name: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { name, value }),
    }
}

fn parse_flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}
