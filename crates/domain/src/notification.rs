//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ReportKind`] | レポート種別 | 新規 bloqueio / 期限到来 / 日次サマリー / 未対応エリア |
//! | [`Report`] | レポート | 種別ごとのテンプレート入力 |
//! | [`EmailMessage`] | メールメッセージ | テンプレートレンダリングの出力 |
//!
//! ## 設計方針
//!
//! - **宛先ロールは種別ごとに固定**: [`ReportKind::allowed_roles`] が唯一の定義
//! - **テンプレート分離**: レポートとメール生成は分離（TemplateRenderer は notifier）
//! - **レポートは永続化しない**: 送信のたびに組み立てて捨てる

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    backlog::AreaCount,
    calendar::ReportDate,
    incident::Bloqueio,
    subscriber::SubscriberRole,
};

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// レポート種別
///
/// ログの `report.kind` フィールドやテンプレート名に使う。
/// snake_case でシリアライズされる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportKind {
    /// 新規 bloqueio: 作成トリガーで即時送信 → admin / dev
    NewBloqueio,
    /// 期限到来: 毎日 07:00、今日が vencimento の bloqueio → admin / dev
    Expiration,
    /// 日次サマリー: 毎日 18:00、今日の件数 → admin のみ
    DailySummary,
    /// 未対応エリア: 毎日 07:30、7 日以上 tratativa のない bloqueio → admin / dev
    UntreatedBacklog,
}

const ADMIN_AND_DEV: &[SubscriberRole] = &[SubscriberRole::Admin, SubscriberRole::Dev];
const ADMIN_ONLY: &[SubscriberRole] = &[SubscriberRole::Admin];

impl ReportKind {
    /// この種別のレポートを受け取れるロール
    pub fn allowed_roles(&self) -> &'static [SubscriberRole] {
        match self {
            Self::NewBloqueio | Self::Expiration | Self::UntreatedBacklog => ADMIN_AND_DEV,
            Self::DailySummary => ADMIN_ONLY,
        }
    }
}

/// レポート（テンプレート入力）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// 新規 bloqueio の即時通知
    NewBloqueio(Bloqueio),
    /// 今日が vencimento の bloqueio 一覧
    Expiration {
        date:  ReportDate,
        items: Vec<Bloqueio>,
    },
    /// 今日の bloqueio / tratativa / finalização 件数
    DailySummary {
        date:         ReportDate,
        bloqueios:    usize,
        tratativas:   usize,
        finalizacoes: usize,
    },
    /// 未対応 bloqueio の多いエリア
    UntreatedBacklog {
        cutoff: ReportDate,
        areas:  Vec<AreaCount>,
    },
}

impl Report {
    /// レポート種別を返す
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::NewBloqueio(_) => ReportKind::NewBloqueio,
            Self::Expiration { .. } => ReportKind::Expiration,
            Self::DailySummary { .. } => ReportKind::DailySummary,
            Self::UntreatedBacklog { .. } => ReportKind::UntreatedBacklog,
        }
    }

    /// 送る内容がないかどうか
    ///
    /// 期限到来・未対応エリアは行が 0 件なら送信しない。
    /// 日次サマリーは件数がすべて 0 でも送信する。
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Expiration { items, .. } => items.is_empty(),
            Self::UntreatedBacklog { areas, .. } => areas.is_empty(),
            Self::NewBloqueio(_) | Self::DailySummary { .. } => false,
        }
    }
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
/// 宛先ごとに個別のメールとして配送される（他の宛先は見えない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        Vec<String>,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}
