//! # Bloqueio / Tratativa / Finalização
//!
//! 通知の元になる 3 種類のレコードを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | コレクション |
//! |---|------------|------------|
//! | [`Bloqueio`] | エリアに対して起票されたロックアウト | `bloqueios` |
//! | [`Tratativa`] | bloqueio（`numero` で参照）への対応記録 | `tratativas` |
//! | [`Finalizacao`] | 完了したワークフローのクローズ記録 | `finalizacoes` |
//!
//! ## 設計方針
//!
//! - **入力検証をしない**: レコードは外部で作成される。欠落したフィールドは
//!   `None` として保持し、テンプレートで空文字（`vencimento` は `-`）として描画する
//! - **`numero` は不透明な識別子**: 保存値が数値でも文字列でも
//!   [`IncidentNumber`] の文字列表現に正規化して比較する
//! - **日付は保存形式の文字列のまま**: `YYYY-MM-DD` 文字列として保持する

use std::fmt;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
};

// =========================================================================
// IncidentNumber（bloqueio 番号）
// =========================================================================

/// bloqueio 番号（値オブジェクト）
///
/// 数値 `1` と文字列 `"1"` は同じ番号として扱う。
/// tratativa から bloqueio への参照はこの値の一致で判定する。
///
/// # 使用例
///
/// ```rust
/// use bloqueio_domain::incident::IncidentNumber;
///
/// let from_number: IncidentNumber = serde_json::from_str("42").unwrap();
/// let from_text: IncidentNumber = serde_json::from_str("\"42\"").unwrap();
/// assert_eq!(from_number, from_text);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IncidentNumber(String);

impl IncidentNumber {
    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for IncidentNumber {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for IncidentNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for IncidentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 浮動小数点の番号を文字列に正規化する
///
/// 整数値なら小数部を付けない（`7.0` → `"7"`）。
pub fn normalize_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

struct IncidentNumberVisitor;

impl<'de> Visitor<'de> for IncidentNumberVisitor {
    type Value = IncidentNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bloqueio 番号（文字列または数値）")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(IncidentNumber::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(IncidentNumber(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(IncidentNumber::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(IncidentNumber(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(IncidentNumber(normalize_number(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(IncidentNumber(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(IncidentNumber::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(IncidentNumber::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    // 配列やオブジェクトは番号として扱えないため空の番号にする
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(IncidentNumber::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(IncidentNumber::default())
    }
}

impl<'de> Deserialize<'de> for IncidentNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IncidentNumberVisitor)
    }
}

// =========================================================================
// テキストフィールド
// =========================================================================

struct LenientTextVisitor;

impl<'de> Visitor<'de> for LenientTextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("テキストとして表示できる値")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(normalize_number(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// テキストフィールドを寛容にデシリアライズする
///
/// 文字列以外のスカラー（数値・真偽値）は文字列表現に変換し、
/// 配列やオブジェクトなど表示できない値は欠落（`None`）として扱う。
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_any(LenientTextVisitor)
}

// =========================================================================
// Bloqueio
// =========================================================================

/// bloqueio（ロックアウト）レコード
///
/// フィールド名は保存形式（camelCase）に合わせてシリアライズする。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bloqueio {
    pub numero:        IncidentNumber,
    #[serde(deserialize_with = "lenient_text")]
    pub nome:          Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub area:          Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub problema:      Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub data_bloqueio: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub vencimento:    Option<String>,
    /// 優先度・担当の区分（ダイジェストにそのまま出力する）
    #[serde(deserialize_with = "lenient_text")]
    pub promax:        Option<String>,
}

impl Bloqueio {
    /// エリア名（欠落時は空文字）
    pub fn area_or_empty(&self) -> &str {
        self.area.as_deref().unwrap_or_default()
    }

    /// 件名用の問題内容（欠落時は空文字）
    pub fn problema_or_empty(&self) -> &str {
        self.problema.as_deref().unwrap_or_default()
    }
}

// =========================================================================
// Tratativa / Finalizacao
// =========================================================================

/// tratativa（対応記録）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tratativa {
    /// 対応した bloqueio の番号
    pub numero:         IncidentNumber,
    #[serde(deserialize_with = "lenient_text")]
    pub data_liberacao: Option<String>,
}

/// finalização（クローズ記録）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Finalizacao {
    #[serde(deserialize_with = "lenient_text")]
    pub data_finalizacao: Option<String>,
}
