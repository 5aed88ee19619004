//! # レポート対象日
//!
//! bloqueio のレコードは日付を `YYYY-MM-DD` 形式の文字列で保持しており、
//! 定期レポートはこの文字列との一致・大小比較でレコードを絞り込む。
//! [`ReportDate`] はその比較キーを生成する値オブジェクト。
//!
//! - 「今日」は UTC ではなく固定タイムゾーン（既定: `America/Sao_Paulo`）の暦日
//! - 「7 日前」は暦日の減算（時刻は考慮しない）

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::DomainError;

/// レポート対象日（値オブジェクト）
///
/// 表示形式は `YYYY-MM-DD`。保存されている日付文字列と辞書順で比較できる。
///
/// # 使用例
///
/// ```rust
/// use bloqueio_domain::calendar::ReportDate;
/// use chrono::NaiveDate;
///
/// let date = ReportDate::from_naive(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
/// assert_eq!(date.to_string(), "2024-05-08");
/// assert_eq!(date.days_before(7).unwrap().to_string(), "2024-05-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    /// 既存の暦日から作成する
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// UTC の現在時刻を指定タイムゾーンの暦日に変換する
    pub fn today(now: DateTime<Utc>, tz: Tz) -> Self {
        Self(now.with_timezone(&tz).date_naive())
    }

    /// `days` 日前の暦日を返す
    pub fn days_before(&self, days: u64) -> Result<Self, DomainError> {
        self.0
            .checked_sub_days(Days::new(days))
            .map(Self)
            .ok_or_else(|| DomainError::DateOutOfRange(format!("{} - {days} 日", self.0)))
    }

    /// 保存形式（`YYYY-MM-DD`）の文字列を返す
    pub fn as_key(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for ReportDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_key())
    }
}

/// タイムゾーン名をパースする
///
/// IANA 名（例: `America/Sao_Paulo`）のみ受け付ける。
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::Validation(format!("不明なタイムゾーンです: {name}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> ReportDate {
        ReportDate::from_naive(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn 表示形式はゼロ埋めのyyyy_mm_dd() {
        assert_eq!(date(2024, 1, 5).to_string(), "2024-01-05");
        assert_eq!(date(2024, 1, 5).as_key(), "2024-01-05");
    }

    #[rstest]
    #[case(2024, 5, 1, 12, "2024-05-01")]
    #[case(2024, 5, 1, 2, "2024-04-30")]
    #[case(2024, 5, 1, 3, "2024-05-01")]
    fn todayはサンパウロの暦日を返す(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] hour_utc: u32,
        #[case] expected: &str,
    ) {
        let now = Utc.with_ymd_and_hms(y, m, d, hour_utc, 0, 0).unwrap();
        assert_eq!(ReportDate::today(now, Sao_Paulo).to_string(), expected);
    }

    #[rstest]
    #[case(date(2024, 5, 8), "2024-05-01")]
    #[case(date(2024, 3, 3), "2024-02-25")]
    #[case(date(2024, 1, 3), "2023-12-27")]
    fn days_beforeは暦日を減算する(#[case] from: ReportDate, #[case] expected: &str) {
        assert_eq!(from.days_before(7).unwrap().to_string(), expected);
    }

    #[test]
    fn days_beforeが範囲外ならエラーを返す() {
        let min = ReportDate::from_naive(NaiveDate::MIN);
        assert!(matches!(
            min.days_before(1),
            Err(DomainError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn 文字列の辞書順と暦日の順序が一致する() {
        let earlier = date(2024, 9, 30);
        let later = date(2024, 10, 1);
        assert!(earlier < later);
        assert!(earlier.as_key() < later.as_key());
    }

    #[test]
    fn serializeは文字列になる() {
        let json = serde_json::to_value(date(2024, 5, 1)).unwrap();
        assert_eq!(json, serde_json::json!("2024-05-01"));
    }

    #[test]
    fn parse_timezoneは不明な名前を拒否する() {
        assert_eq!(parse_timezone("America/Sao_Paulo").unwrap(), Sao_Paulo);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
