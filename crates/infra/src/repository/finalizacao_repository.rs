//! # FinalizacaoRepository
//!
//! finalização（`finalizacoes` コレクション）の読み取りを担当する。

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use bloqueio_domain::{calendar::ReportDate, incident::Finalizacao};

use crate::{
    InfraError,
    dynamodb::{self, ScanFilter},
};

/// finalização リポジトリトレイト
#[async_trait]
pub trait FinalizacaoRepository: Send + Sync {
    /// `dataFinalizacao` が指定日と一致する finalização を取得する
    async fn find_by_data_finalizacao(
        &self,
        date: &ReportDate,
    ) -> Result<Vec<Finalizacao>, InfraError>;
}

/// DynamoDB 実装の FinalizacaoRepository
pub struct DynamoDbFinalizacaoRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbFinalizacaoRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl FinalizacaoRepository for DynamoDbFinalizacaoRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%date))]
    async fn find_by_data_finalizacao(
        &self,
        date: &ReportDate,
    ) -> Result<Vec<Finalizacao>, InfraError> {
        let filter = ScanFilter::eq("dataFinalizacao", date.as_key());
        let items = dynamodb::scan_all(&self.client, &self.table_name, Some(&filter)).await?;
        dynamodb::decode_items(&items)
    }
}
