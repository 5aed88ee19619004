//! # SubscriberRepository
//!
//! 通知購読者（`emails` コレクション）の読み取りを担当する。

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use bloqueio_domain::subscriber::Subscriber;

use crate::{InfraError, dynamodb};

/// 購読者リポジトリトレイト
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// すべての購読者を格納順で取得する
    async fn find_all(&self) -> Result<Vec<Subscriber>, InfraError>;
}

/// DynamoDB 実装の SubscriberRepository
pub struct DynamoDbSubscriberRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbSubscriberRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl SubscriberRepository for DynamoDbSubscriberRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Subscriber>, InfraError> {
        let items = dynamodb::scan_all(&self.client, &self.table_name, None).await?;
        dynamodb::decode_items(&items)
    }
}
