//! # DynamoDB 接続管理
//!
//! Amazon DynamoDB への接続管理と、コレクション（テーブル）の読み取りを行う。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: DynamoDB Local を使用（`-sharedDb -inMemory`）
//! - **本番環境**: デフォルトの認証情報プロバイダチェーンで Amazon DynamoDB に接続
//! - **テーブル自動作成**: `DYNAMODB_ENSURE_TABLES` 有効時のみ起動時に作成（冪等）
//! - **スキーマレス**: 各コレクションは `id` をパーティションキーとするだけで、
//!   その他の属性はレコード作成側が自由に書き込む
//!
//! ## アイテムの変換
//!
//! DynamoDB のアイテム（`AttributeValue` のマップ）は一度 `serde_json::Value` に
//! 変換してからドメインモデルにデシリアライズする。数値属性（`N`）は JSON の数値に
//! なるため、`numero` が数値で保存されていても文字列と同じ番号として扱える。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use bloqueio_infra::dynamodb;
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = dynamodb::create_client(Some("http://localhost:18000")).await;
//!     dynamodb::ensure_collection_table(&client, "bloqueios").await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;

use aws_sdk_dynamodb::{
    Client,
    types::{
        AttributeDefinition,
        AttributeValue,
        BillingMode,
        KeySchemaElement,
        KeyType,
        ScalarAttributeType,
    },
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::InfraError;

/// DynamoDB のアイテム
pub type Item = HashMap<String, AttributeValue>;

/// DynamoDB クライアントを作成する
///
/// `endpoint` を指定した場合は DynamoDB Local 用のクライアントを作成する。
/// 認証情報はダミー値を使用する（DynamoDB Local の `-sharedDb` モードでは
/// 認証情報を検証しない）。
///
/// `None` の場合は環境変数・IAM ロール等のデフォルト設定を読み込む。
pub async fn create_client(endpoint: Option<&str>) -> Client {
    let config = match endpoint {
        Some(endpoint) => {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .endpoint_url(endpoint)
                .region(aws_config::Region::new("sa-east-1"))
                // DynamoDB Local はクレデンシャルを検証しないが、SDK はプロバイダが必要
                .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                    "local", "local", None, None, "local",
                ))
                .load()
                .await
        }
        None => aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await,
    };

    Client::new(&config)
}

/// コレクション用テーブルが存在しなければ作成する（冪等）
///
/// テーブルスキーマ:
/// - PK: `id` (String): レコード ID
///
/// # 引数
///
/// * `client` - DynamoDB クライアント
/// * `table_name` - テーブル名
pub async fn ensure_collection_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    // テーブルの存在確認
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => {
            tracing::debug!("テーブル '{}' は既に存在します", table_name);
            return Ok(());
        }
        Err(err) => {
            // ResourceNotFoundException の場合のみテーブル作成に進む
            let not_found = err
                .as_service_error()
                .map(|e| e.is_resource_not_found_exception())
                .unwrap_or(false);
            if !not_found {
                return Err(InfraError::dynamo_db(format!(
                    "テーブル '{table_name}' の確認に失敗: {err}"
                )));
            }
        }
    }

    tracing::info!("テーブル '{}' を作成します", table_name);

    let create_result = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("id")
                .key_type(KeyType::Hash)
                .build()
                .map_err(|e| InfraError::dynamo_db(format!("KeySchema 構築エラー: {e}")))?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("id")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| {
                    InfraError::dynamo_db(format!("AttributeDefinition 構築エラー: {e}"))
                })?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    if let Err(err) = create_result {
        // ResourceInUseException は並行呼び出し時に発生しうる（テーブルが作成中）
        let is_resource_in_use = err
            .as_service_error()
            .map(|e| e.is_resource_in_use_exception())
            .unwrap_or(false);
        if !is_resource_in_use {
            return Err(InfraError::dynamo_db(format!(
                "テーブル '{table_name}' の作成に失敗: {err}"
            )));
        }
        tracing::debug!(
            "テーブル '{}' は既に作成中または存在します（ResourceInUseException）",
            table_name
        );
        return Ok(());
    }

    tracing::info!("テーブル '{}' を作成しました", table_name);

    Ok(())
}

// =========================================================================
// スキャン
// =========================================================================

/// スキャンの絞り込み条件
///
/// 属性名は常に `ExpressionAttributeNames` 経由で参照する
/// （`area` などが DynamoDB の予約語と衝突しないように）。
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFilter {
    attribute: String,
    operator:  &'static str,
    value:     String,
}

impl ScanFilter {
    /// `attribute = value`
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            operator:  "=",
            value:     value.into(),
        }
    }

    /// `attribute <= value`（文字列の辞書順比較）
    pub fn le(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            operator:  "<=",
            value:     value.into(),
        }
    }

    fn expression(&self) -> String {
        format!("#attr {} :value", self.operator)
    }
}

/// テーブル全体をスキャンし、条件に一致するアイテムをすべて返す
///
/// `LastEvaluatedKey` がなくなるまでページングする。
/// 文字列属性との比較のため、数値で保存された日付は一致しない。
#[tracing::instrument(skip_all, level = "debug", fields(table = %table_name))]
pub async fn scan_all(
    client: &Client,
    table_name: &str,
    filter: Option<&ScanFilter>,
) -> Result<Vec<Item>, InfraError> {
    let mut items = Vec::new();
    let mut start_key: Option<Item> = None;

    loop {
        let mut scan = client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(start_key.take());

        if let Some(filter) = filter {
            scan = scan
                .filter_expression(filter.expression())
                .expression_attribute_names("#attr", &filter.attribute)
                .expression_attribute_values(":value", AttributeValue::S(filter.value.clone()));
        }

        let output = scan.send().await.map_err(|e| {
            InfraError::dynamo_db(format!("テーブル '{table_name}' のスキャンに失敗: {e}"))
        })?;

        items.extend(output.items.unwrap_or_default());

        match output.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    tracing::debug!(count = items.len(), "スキャン完了");
    Ok(items)
}

/// スキャン結果をドメインモデルに変換する
pub fn decode_items<T: DeserializeOwned>(items: &[Item]) -> Result<Vec<T>, InfraError> {
    items
        .iter()
        .map(|item| serde_json::from_value(item_to_json(item)).map_err(InfraError::from))
        .collect()
}

/// DynamoDB アイテムを JSON オブジェクトに変換する
pub fn item_to_json(item: &Item) -> Value {
    Value::Object(
        item.iter()
            .map(|(key, value)| (key.clone(), attribute_to_json(value)))
            .collect::<Map<String, Value>>(),
    )
}

/// 属性値を JSON に変換する
///
/// バイナリ属性は表示できないため `null` として扱う。
fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), attribute_to_json(value)))
                .collect(),
        ),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(values.iter().map(|n| number_to_json(n)).collect()),
        _ => Value::Null,
    }
}

/// 数値属性（文字列表現）を JSON の数値に変換する
///
/// 整数・浮動小数点のいずれとしても解釈できない場合は文字列のまま保持する。
fn number_to_json(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;
    use bloqueio_domain::{
        incident::{Bloqueio, IncidentNumber},
        subscriber::{Subscriber, SubscriberRole, select_emails},
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn 属性値をjsonに変換できる() {
        let item = item(&[
            ("s", AttributeValue::S("texto".to_string())),
            ("n", AttributeValue::N("42".to_string())),
            ("f", AttributeValue::N("1.5".to_string())),
            ("b", AttributeValue::Bool(true)),
            ("null", AttributeValue::Null(true)),
            (
                "l",
                AttributeValue::L(vec![AttributeValue::S("a".to_string())]),
            ),
            ("ss", AttributeValue::Ss(vec!["x".to_string()])),
            ("bin", AttributeValue::B(Blob::new(vec![0, 1]))),
        ]);

        assert_eq!(
            item_to_json(&item),
            json!({
                "s": "texto",
                "n": 42,
                "f": 1.5,
                "b": true,
                "null": null,
                "l": ["a"],
                "ss": ["x"],
                "bin": null,
            })
        );
    }

    #[test]
    fn 数値のnumeroを持つアイテムをbloqueioに変換できる() {
        let items = vec![item(&[
            ("id", AttributeValue::S("doc-1".to_string())),
            ("numero", AttributeValue::N("101".to_string())),
            ("area", AttributeValue::S("Envase".to_string())),
            ("vencimento", AttributeValue::S("2024-05-01".to_string())),
        ])];

        let bloqueios: Vec<Bloqueio> = decode_items(&items).unwrap();

        assert_eq!(bloqueios.len(), 1);
        assert_eq!(bloqueios[0].numero, IncidentNumber::from("101"));
        assert_eq!(bloqueios[0].area.as_deref(), Some("Envase"));
        assert!(bloqueios[0].promax.is_none());
    }

    #[test]
    fn tipoがnullの購読者が混ざっても他の購読者を読み込める() {
        let items = vec![
            item(&[
                ("id", AttributeValue::S("sub-1".to_string())),
                ("email", AttributeValue::S("ana@example.com".to_string())),
                ("tipo", AttributeValue::S("admin".to_string())),
            ]),
            item(&[
                ("id", AttributeValue::S("sub-2".to_string())),
                ("email", AttributeValue::S("x@example.com".to_string())),
                ("tipo", AttributeValue::Null(true)),
            ]),
            item(&[
                ("id", AttributeValue::S("sub-3".to_string())),
                ("email", AttributeValue::Null(true)),
                ("tipo", AttributeValue::N("1".to_string())),
            ]),
        ];

        let subscribers: Vec<Subscriber> = decode_items(&items).unwrap();

        assert_eq!(subscribers.len(), 3);
        assert_eq!(subscribers[2].role, SubscriberRole::Other("1".to_string()));
        assert_eq!(
            select_emails(&subscribers, Some(&[SubscriberRole::Admin])),
            vec!["ana@example.com"]
        );
    }

    #[test]
    fn 番号が真偽値のアイテムもbloqueioに変換できる() {
        let items = vec![item(&[
            ("numero", AttributeValue::Bool(true)),
            ("area", AttributeValue::S("Envase".to_string())),
        ])];

        let bloqueios: Vec<Bloqueio> = decode_items(&items).unwrap();

        assert_eq!(bloqueios[0].numero, IncidentNumber::from("true"));
    }

    #[test]
    fn 解釈できない数値は文字列として保持する() {
        assert_eq!(number_to_json("NaN"), json!("NaN"));
        assert_eq!(number_to_json("-3"), json!(-3));
    }

    #[test]
    fn scan_filterの式は属性名をプレースホルダで参照する() {
        assert_eq!(ScanFilter::eq("vencimento", "2024-05-01").expression(), "#attr = :value");
        assert_eq!(ScanFilter::le("dataBloqueio", "2024-04-24").expression(), "#attr <= :value");
    }
}
