//! # TratativaRepository
//!
//! tratativa（`tratativas` コレクション）の読み取りを担当する。

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use bloqueio_domain::{calendar::ReportDate, incident::Tratativa};

use crate::{
    InfraError,
    dynamodb::{self, ScanFilter},
};

/// tratativa リポジトリトレイト
#[async_trait]
pub trait TratativaRepository: Send + Sync {
    /// `dataLiberacao` が指定日と一致する tratativa を取得する
    async fn find_by_data_liberacao(&self, date: &ReportDate)
    -> Result<Vec<Tratativa>, InfraError>;

    /// すべての tratativa を取得する
    ///
    /// 未対応エリアの集計は日付で絞り込まず全件を対象にする。
    async fn find_all(&self) -> Result<Vec<Tratativa>, InfraError>;
}

/// DynamoDB 実装の TratativaRepository
pub struct DynamoDbTratativaRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbTratativaRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl TratativaRepository for DynamoDbTratativaRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%date))]
    async fn find_by_data_liberacao(
        &self,
        date: &ReportDate,
    ) -> Result<Vec<Tratativa>, InfraError> {
        let filter = ScanFilter::eq("dataLiberacao", date.as_key());
        let items = dynamodb::scan_all(&self.client, &self.table_name, Some(&filter)).await?;
        dynamodb::decode_items(&items)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Tratativa>, InfraError> {
        let items = dynamodb::scan_all(&self.client, &self.table_name, None).await?;
        dynamodb::decode_items(&items)
    }
}
