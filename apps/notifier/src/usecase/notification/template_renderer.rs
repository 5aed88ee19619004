//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンでレポートメールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名はテンプレート外で組み立てる**: 件名の書式はレポート種別ごとに固定
//! - **欠落フィールドは空文字**: 不完全なレコードでもメール生成は失敗させない
//!   （`vencimento` のみ `-` で表示する）

use bloqueio_domain::{
    incident::Bloqueio,
    notification::{EmailMessage, NotificationError, Report},
};
use serde::Serialize;
use tera::{Context, Tera};

/// 期限到来ダイジェストの 1 行
#[derive(Debug, Serialize)]
struct DigestLine<'a> {
    numero:   &'a str,
    problema: &'a str,
    area:     &'a str,
    promax:   &'a str,
}

impl<'a> From<&'a Bloqueio> for DigestLine<'a> {
    fn from(bloqueio: &'a Bloqueio) -> Self {
        Self {
            numero:   bloqueio.numero.as_str(),
            problema: bloqueio.problema_or_empty(),
            area:     bloqueio.area_or_empty(),
            promax:   bloqueio.promax.as_deref().unwrap_or_default(),
        }
    }
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`Report` から `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "new_bloqueio.html",
                    include_str!("../../../templates/notifications/new_bloqueio.html"),
                ),
                (
                    "new_bloqueio.txt",
                    include_str!("../../../templates/notifications/new_bloqueio.txt"),
                ),
                (
                    "expiration.html",
                    include_str!("../../../templates/notifications/expiration.html"),
                ),
                (
                    "expiration.txt",
                    include_str!("../../../templates/notifications/expiration.txt"),
                ),
                (
                    "daily_summary.html",
                    include_str!("../../../templates/notifications/daily_summary.html"),
                ),
                (
                    "daily_summary.txt",
                    include_str!("../../../templates/notifications/daily_summary.txt"),
                ),
                (
                    "untreated_backlog.html",
                    include_str!("../../../templates/notifications/untreated_backlog.html"),
                ),
                (
                    "untreated_backlog.txt",
                    include_str!("../../../templates/notifications/untreated_backlog.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// レポートからメールメッセージを生成する
    ///
    /// テンプレート名はレポート種別の snake_case 表記と一致する。
    pub fn render(
        &self,
        report: &Report,
        recipients: Vec<String>,
    ) -> Result<EmailMessage, NotificationError> {
        let template_name: &str = report.kind().into();
        let (subject, context) = build_template_params(report);

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            to: recipients,
            subject,
            html_body,
            text_body,
        })
    }
}

/// 件名とテンプレートコンテキストを構築する
fn build_template_params(report: &Report) -> (String, Context) {
    let mut context = Context::new();

    let subject = match report {
        Report::NewBloqueio(bloqueio) => {
            let text = |value: &Option<String>| value.clone().unwrap_or_default();
            let vencimento = bloqueio
                .vencimento
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or("-");

            context.insert("numero", bloqueio.numero.as_str());
            context.insert("nome", &text(&bloqueio.nome));
            context.insert("area", bloqueio.area_or_empty());
            context.insert("problema", bloqueio.problema_or_empty());
            context.insert("data_bloqueio", &text(&bloqueio.data_bloqueio));
            context.insert("vencimento", vencimento);

            format!(
                "Novo Bloqueio #{} ({})",
                bloqueio.numero,
                bloqueio.problema_or_empty()
            )
        }
        Report::Expiration { date, items } => {
            let lines: Vec<DigestLine<'_>> = items.iter().map(DigestLine::from).collect();
            context.insert("date", date);
            context.insert("items", &lines);
            format!("Vencimentos ({date})")
        }
        Report::DailySummary {
            date,
            bloqueios,
            tratativas,
            finalizacoes,
        } => {
            context.insert("date", date);
            context.insert("bloqueios", bloqueios);
            context.insert("tratativas", tratativas);
            context.insert("finalizacoes", finalizacoes);
            format!("Resumo diário ({date})")
        }
        Report::UntreatedBacklog { cutoff, areas } => {
            context.insert("cutoff", cutoff);
            context.insert("areas", areas);
            "Áreas sem tratativa (>7 dias)".to_string()
        }
    };

    (subject, context)
}

#[cfg(test)]
mod tests {
    use bloqueio_domain::{backlog::AreaCount, calendar::ReportDate, incident::IncidentNumber};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> ReportDate {
        ReportDate::from_naive(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn recipients() -> Vec<String> {
        vec!["ana@example.com".to_string()]
    }

    fn bloqueio() -> Bloqueio {
        Bloqueio {
            numero: IncidentNumber::from(7),
            nome: Some("Linha 3".to_string()),
            area: Some("Envase".to_string()),
            problema: Some("Selo vencido".to_string()),
            data_bloqueio: Some("2024-05-01".to_string()),
            vencimento: None,
            promax: Some("P1".to_string()),
        }
    }

    #[test]
    fn 新規bloqueioの件名に番号と問題を含める() {
        let email = renderer()
            .render(&Report::NewBloqueio(bloqueio()), recipients())
            .unwrap();

        assert_eq!(email.subject, "Novo Bloqueio #7 (Selo vencido)");
        assert_eq!(email.to, recipients());
        assert!(email.html_body.contains("<h3>Novo Bloqueio</h3>"));
        assert!(email.html_body.contains("<b>Número:</b> 7"));
        assert!(email.html_body.contains("<b>Nome:</b> Linha 3"));
        assert!(email.html_body.contains("<b>Área:</b> Envase"));
        assert!(email.html_body.contains("<b>Data:</b> 2024-05-01"));
        assert!(email.text_body.contains("Problema: Selo vencido"));
    }

    #[test]
    fn vencimentoがなければハイフンで表示する() {
        let email = renderer()
            .render(&Report::NewBloqueio(bloqueio()), recipients())
            .unwrap();

        assert!(email.html_body.contains("<b>Vencimento:</b> -"));
        assert!(email.text_body.contains("Vencimento: -"));
    }

    #[test]
    fn 欠落フィールドは空文字で表示する() {
        let sparse = Bloqueio {
            numero: IncidentNumber::from("12"),
            ..Default::default()
        };

        let email = renderer()
            .render(&Report::NewBloqueio(sparse), recipients())
            .unwrap();

        assert_eq!(email.subject, "Novo Bloqueio #12 ()");
        assert!(email.html_body.contains("<b>Problema:</b> </p>"));
    }

    #[test]
    fn html本文はエスケープされる() {
        let mut unsafe_input = bloqueio();
        unsafe_input.problema = Some("<script>".to_string());

        let email = renderer()
            .render(&Report::NewBloqueio(unsafe_input), recipients())
            .unwrap();

        assert!(!email.html_body.contains("<script>"));
        assert!(email.text_body.contains("<script>"));
    }

    #[test]
    fn 期限到来ダイジェストは1件1行で出力する() {
        let report = Report::Expiration {
            date:  date(2024, 5, 1),
            items: vec![bloqueio()],
        };

        let email = renderer().render(&report, recipients()).unwrap();

        assert_eq!(email.subject, "Vencimentos (2024-05-01)");
        assert!(email.html_body.contains("Selos vencendo hoje (2024-05-01)"));
        assert!(
            email
                .html_body
                .contains("<p>#7 &bull; Selo vencido &bull; Envase &bull; P1</p>")
        );
        assert_eq!(email.html_body.matches("<p>#").count(), 1);
    }

    #[test]
    fn 日次サマリーは3つの件数を含む() {
        let report = Report::DailySummary {
            date:         date(2024, 5, 1),
            bloqueios:    3,
            tratativas:   0,
            finalizacoes: 2,
        };

        let email = renderer().render(&report, recipients()).unwrap();

        assert_eq!(email.subject, "Resumo diário (2024-05-01)");
        assert!(email.html_body.contains("Bloqueios: 3"));
        assert!(email.html_body.contains("Tratativas: 0"));
        assert!(email.html_body.contains("Finalizações: 2"));
    }

    #[test]
    fn 未対応エリアは件数の多い順に出力する() {
        let report = Report::UntreatedBacklog {
            cutoff: date(2024, 4, 24),
            areas:  vec![AreaCount::new("X", 2), AreaCount::new("Y", 1)],
        };

        let email = renderer().render(&report, recipients()).unwrap();

        assert_eq!(email.subject, "Áreas sem tratativa (>7 dias)");
        assert!(email.html_body.contains("<h3>Áreas sem tratativa &gt; 7 dias</h3>"));
        let x = email.html_body.find("<p>X: 2</p>").unwrap();
        let y = email.html_body.find("<p>Y: 1</p>").unwrap();
        assert!(x < y);
        assert!(email.text_body.contains("- X: 2"));
    }
}
