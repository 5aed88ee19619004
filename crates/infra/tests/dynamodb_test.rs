//! DynamoDB 接続・テーブル自動作成・コレクション読み取りの統合テスト
//!
//! DynamoDB Local を使用するため、通常の `cargo test` では実行されない。
//!
//! 実行方法:
//! ```bash
//! docker run -p 18000:8000 amazon/dynamodb-local -jar DynamoDBLocal.jar -sharedDb -inMemory
//! cargo test -p bloqueio-infra --test dynamodb_test -- --ignored
//! ```

use std::collections::HashMap;

use aws_sdk_dynamodb::{Client, types::AttributeValue};
use bloqueio_domain::{calendar::ReportDate, incident::IncidentNumber, subscriber::SubscriberRole};
use bloqueio_infra::{
   dynamodb,
   repository::{
      BloqueioRepository,
      DynamoDbBloqueioRepository,
      DynamoDbSubscriberRepository,
      DynamoDbTratativaRepository,
      SubscriberRepository,
      TratativaRepository,
   },
};
use chrono::NaiveDate;

/// テスト用の DynamoDB エンドポイント
///
/// 優先順位:
/// 1. `DYNAMODB_ENDPOINT`
/// 2. `DYNAMODB_PORT` から構築
/// 3. フォールバック: `http://localhost:18000`
fn dynamodb_endpoint() -> String {
   std::env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| {
      let port = std::env::var("DYNAMODB_PORT").unwrap_or_else(|_| "18000".to_string());
      format!("http://localhost:{port}")
   })
}

/// ランダムなテーブル名で分離（他テストとの競合を防止）
fn table_name(prefix: &str) -> String {
   format!("test_{prefix}_{}", uuid::Uuid::now_v7())
}

fn date(y: i32, m: u32, d: u32) -> ReportDate {
   ReportDate::from_naive(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

async fn put(client: &Client, table: &str, attributes: &[(&str, AttributeValue)]) {
   let item: HashMap<String, AttributeValue> = attributes
      .iter()
      .map(|(k, v)| (k.to_string(), v.clone()))
      .chain(std::iter::once((
         "id".to_string(),
         AttributeValue::S(uuid::Uuid::now_v7().to_string()),
      )))
      .collect();

   client
      .put_item()
      .table_name(table)
      .set_item(Some(item))
      .send()
      .await
      .unwrap();
}

fn s(value: &str) -> AttributeValue {
   AttributeValue::S(value.to_string())
}

#[tokio::test]
#[ignore = "DynamoDB Local が必要"]
async fn test_ensure_collection_tableが冪等にテーブルを作成する() {
   let client = dynamodb::create_client(Some(&dynamodb_endpoint())).await;
   let table = table_name("bloqueios");

   let first = dynamodb::ensure_collection_table(&client, &table).await;
   assert!(first.is_ok(), "テーブル作成に失敗: {:?}", first.err());

   let second = dynamodb::ensure_collection_table(&client, &table).await;
   assert!(second.is_ok(), "2回目の呼び出しでエラー: {:?}", second.err());

   let described = client
      .describe_table()
      .table_name(&table)
      .send()
      .await
      .unwrap();
   let key_schema = described.table.unwrap().key_schema.unwrap_or_default();
   assert!(
      key_schema.iter().any(|ks| ks.attribute_name() == "id"
         && ks.key_type == aws_sdk_dynamodb::types::KeyType::Hash),
      "id HASH キーが見つかりません"
   );

   let _ = client.delete_table().table_name(&table).send().await;
}

#[tokio::test]
#[ignore = "DynamoDB Local が必要"]
async fn test_bloqueioを日付属性で絞り込める() {
   let client = dynamodb::create_client(Some(&dynamodb_endpoint())).await;
   let table = table_name("bloqueios");
   dynamodb::ensure_collection_table(&client, &table)
      .await
      .unwrap();

   put(&client, &table, &[
      ("numero", AttributeValue::N("1".to_string())),
      ("area", s("X")),
      ("dataBloqueio", s("2024-04-20")),
      ("vencimento", s("2024-05-01")),
   ])
   .await;
   put(&client, &table, &[
      ("numero", s("2")),
      ("area", s("Y")),
      ("dataBloqueio", s("2024-04-30")),
   ])
   .await;

   let repo = DynamoDbBloqueioRepository::new(client.clone(), table.clone());

   let due = repo.find_by_vencimento(&date(2024, 5, 1)).await.unwrap();
   assert_eq!(due.len(), 1);
   assert_eq!(due[0].numero, IncidentNumber::from(1));

   let old = repo
      .find_opened_on_or_before(&date(2024, 4, 24))
      .await
      .unwrap();
   assert_eq!(old.len(), 1);
   assert_eq!(old[0].area.as_deref(), Some("X"));

   let opened = repo.find_by_data_bloqueio(&date(2024, 4, 30)).await.unwrap();
   assert_eq!(opened.len(), 1);

   let _ = client.delete_table().table_name(&table).send().await;
}

#[tokio::test]
#[ignore = "DynamoDB Local が必要"]
async fn test_購読者とtratativaを全件取得できる() {
   let client = dynamodb::create_client(Some(&dynamodb_endpoint())).await;
   let subscribers_table = table_name("emails");
   let tratativas_table = table_name("tratativas");
   dynamodb::ensure_collection_table(&client, &subscribers_table)
      .await
      .unwrap();
   dynamodb::ensure_collection_table(&client, &tratativas_table)
      .await
      .unwrap();

   put(&client, &subscribers_table, &[("email", s("ana@example.com")), ("tipo", s("admin"))]).await;
   put(&client, &tratativas_table, &[("numero", s("1")), ("dataLiberacao", s("2024-05-01"))]).await;

   let subscribers = DynamoDbSubscriberRepository::new(client.clone(), subscribers_table.clone())
      .find_all()
      .await
      .unwrap();
   assert_eq!(subscribers.len(), 1);
   assert_eq!(subscribers[0].role, SubscriberRole::Admin);

   let tratativas = DynamoDbTratativaRepository::new(client.clone(), tratativas_table.clone());
   assert_eq!(tratativas.find_all().await.unwrap().len(), 1);
   assert_eq!(
      tratativas
         .find_by_data_liberacao(&date(2024, 5, 1))
         .await
         .unwrap()
         .len(),
      1
   );

   let _ = client.delete_table().table_name(&subscribers_table).send().await;
   let _ = client.delete_table().table_name(&tratativas_table).send().await;
}
