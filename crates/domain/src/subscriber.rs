//! # 通知購読者
//!
//! メール通知の受信者となる購読者（`emails` コレクション）を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Subscriber`] | 購読者 | メールアドレスとロール（`tipo`）の組 |
//! | [`SubscriberRole`] | 購読者ロール | `admin` / `dev` / その他 |
//!
//! 購読者は外部で管理され、このシステムからは読み取り専用。
//! 同一性はメールアドレスで判定する。
//!
//! 不正な購読者レコード（`tipo` が文字列でない、`email` が欠落しているなど）が
//! 1 件あっても他の購読者への通知は止めない。そのレコードはどのロールにも
//! 該当しないか、宛先の選択で除外される。

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::incident::lenient_text;

/// 購読者ロール（`tipo`）
///
/// 保存値が `admin` / `dev` 以外の場合も [`Other`](SubscriberRole::Other) として
/// 元の文字列を保持する。`tipo` が欠落・`null`・オブジェクトの購読者は空文字の `Other`、
/// 数値や真偽値はその文字列表現の `Other` になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriberRole {
    /// 管理者: すべてのレポートを受け取る
    Admin,
    /// 開発者: 日次サマリー以外のレポートを受け取る
    Dev,
    /// 上記以外のロール
    Other(String),
}

impl SubscriberRole {
    /// 保存形式の文字列を返す
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Dev => "dev",
            Self::Other(value) => value,
        }
    }
}

impl Default for SubscriberRole {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for SubscriberRole {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "dev" => Self::Dev,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SubscriberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SubscriberRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SubscriberRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = lenient_text(deserializer)?;
        Ok(value.map_or_else(Self::default, |value| Self::from(value.as_str())))
    }
}

/// 購読者
///
/// 欠落したフィールドは既定値（空文字のメールアドレス、空文字のロール）になる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscriber {
    #[serde(deserialize_with = "text_or_empty")]
    pub email: String,
    #[serde(rename = "tipo")]
    pub role:  SubscriberRole,
}

impl Subscriber {
    pub fn new(email: impl Into<String>, role: SubscriberRole) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    /// ロールが `roles` のいずれかに含まれるかを返す
    pub fn has_any_role(&self, roles: &[SubscriberRole]) -> bool {
        roles.contains(&self.role)
    }
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// 購読者リストから宛先メールアドレスを選択する
///
/// - `roles` が `None` の場合はすべての購読者のメールアドレスを返す
/// - `Some` の場合はロールが含まれる購読者のみを返す
/// - メールアドレスが空の購読者は宛先にしない
///
/// 順序は入力（コレクションの格納順）のまま。重複の追加・除去は行わない。
pub fn select_emails(subscribers: &[Subscriber], roles: Option<&[SubscriberRole]>) -> Vec<String> {
    subscribers
        .iter()
        .filter(|s| !s.email.trim().is_empty() && roles.is_none_or(|roles| s.has_any_role(roles)))
        .map(|s| s.email.clone())
        .collect()
}
