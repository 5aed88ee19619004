//! # 通知ユースケース
//!
//! レポートのメール生成・宛先解決・送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`service`] - 宛先解決 + テンプレートレンダリング + 送信の統合サービス

pub mod service;
pub mod template_renderer;

pub use service::{DispatchOutcome, NotificationService};
pub use template_renderer::TemplateRenderer;
