//! # BloqueioRepository
//!
//! bloqueio（`bloqueios` コレクション）の読み取りを担当する。
//!
//! 日付属性（`vencimento` / `dataBloqueio`）は `YYYY-MM-DD` 文字列として
//! 保存されている前提で、文字列比較で絞り込む。

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use bloqueio_domain::{calendar::ReportDate, incident::Bloqueio};

use crate::{
    InfraError,
    dynamodb::{self, ScanFilter},
};

/// bloqueio リポジトリトレイト
#[async_trait]
pub trait BloqueioRepository: Send + Sync {
    /// `vencimento` が指定日と一致する bloqueio を取得する
    async fn find_by_vencimento(&self, date: &ReportDate) -> Result<Vec<Bloqueio>, InfraError>;

    /// `dataBloqueio` が指定日と一致する bloqueio を取得する
    async fn find_by_data_bloqueio(&self, date: &ReportDate) -> Result<Vec<Bloqueio>, InfraError>;

    /// `dataBloqueio` が指定日以前の bloqueio を取得する
    ///
    /// `dataBloqueio` を持たないレコードは含まない。
    async fn find_opened_on_or_before(
        &self,
        cutoff: &ReportDate,
    ) -> Result<Vec<Bloqueio>, InfraError>;
}

/// DynamoDB 実装の BloqueioRepository
pub struct DynamoDbBloqueioRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbBloqueioRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn scan(&self, filter: ScanFilter) -> Result<Vec<Bloqueio>, InfraError> {
        let items = dynamodb::scan_all(&self.client, &self.table_name, Some(&filter)).await?;
        dynamodb::decode_items(&items)
    }
}

#[async_trait]
impl BloqueioRepository for DynamoDbBloqueioRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%date))]
    async fn find_by_vencimento(&self, date: &ReportDate) -> Result<Vec<Bloqueio>, InfraError> {
        self.scan(ScanFilter::eq("vencimento", date.as_key())).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%date))]
    async fn find_by_data_bloqueio(&self, date: &ReportDate) -> Result<Vec<Bloqueio>, InfraError> {
        self.scan(ScanFilter::eq("dataBloqueio", date.as_key())).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%cutoff))]
    async fn find_opened_on_or_before(
        &self,
        cutoff: &ReportDate,
    ) -> Result<Vec<Bloqueio>, InfraError> {
        self.scan(ScanFilter::le("dataBloqueio", cutoff.as_key())).await
    }
}
