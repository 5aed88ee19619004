//! # 未対応 bloqueio のエリア別集計
//!
//! 起票から 7 日以上経過しても tratativa が 1 件も記録されていない bloqueio を
//! エリアごとに数え、件数の多い順に上位 [`BACKLOG_TOP_N`] エリアを返す。
//!
//! ## 集計ルール
//!
//! 1. tratativa 全件の `numero` から「対応済み番号」の集合を作る
//! 2. 対象 bloqueio のうち番号が集合に含まれないものをエリア別に数える
//! 3. 件数の降順、同数ならエリア名の昇順で並べる（決定的な順序）
//! 4. 先頭 [`BACKLOG_TOP_N`] 件に切り詰める
//!
//! エリアが欠落した bloqueio は空文字のエリアとして数える。

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::incident::{Bloqueio, IncidentNumber, Tratativa};

/// レポートに載せるエリア数の上限
pub const BACKLOG_TOP_N: usize = 10;

/// 未対応 bloqueio を集計する経過日数
pub const BACKLOG_AGE_DAYS: u64 = 7;

/// エリア別の未対応件数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCount {
    pub area:    String,
    pub pending: usize,
}

impl AreaCount {
    pub fn new(area: impl Into<String>, pending: usize) -> Self {
        Self {
            area: area.into(),
            pending,
        }
    }
}

/// 未対応 bloqueio のエリア別件数（上位 [`BACKLOG_TOP_N`] 件）を返す
///
/// `incidents` は呼び出し側で起票日により絞り込み済みであること。
/// `treatments` は日付で絞り込まない全件を渡す。
pub fn pending_by_area(incidents: &[Bloqueio], treatments: &[Tratativa]) -> Vec<AreaCount> {
    let treated: HashSet<&IncidentNumber> = treatments.iter().map(|t| &t.numero).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for incident in incidents.iter().filter(|b| !treated.contains(&b.numero)) {
        *counts.entry(incident.area_or_empty()).or_default() += 1;
    }

    let mut ranked: Vec<AreaCount> = counts
        .into_iter()
        .map(|(area, pending)| AreaCount::new(area, pending))
        .collect();
    ranked.sort_by(|a, b| b.pending.cmp(&a.pending).then_with(|| a.area.cmp(&b.area)));
    ranked.truncate(BACKLOG_TOP_N);
    ranked
}
