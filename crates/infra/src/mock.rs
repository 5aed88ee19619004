//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモックリポジトリと通知送信者。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! bloqueio-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 日付による絞り込みは DynamoDB 実装と同じく `YYYY-MM-DD` 文字列の比較で行う。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bloqueio_domain::{
   calendar::ReportDate,
   incident::{Bloqueio, Finalizacao, Tratativa},
   notification::{EmailMessage, NotificationError},
   subscriber::Subscriber,
};

use crate::{
   error::InfraError,
   notification::NotificationSender,
   repository::{
      BloqueioRepository,
      FinalizacaoRepository,
      SubscriberRepository,
      TratativaRepository,
   },
};

/// 失敗注入用のメッセージ
type Failure = Arc<Mutex<Option<String>>>;

fn check(failure: &Failure) -> Result<(), InfraError> {
   match failure.lock().unwrap().as_deref() {
      Some(message) => Err(InfraError::dynamo_db(message)),
      None => Ok(()),
   }
}

// ===== MockSubscriberRepository =====

#[derive(Clone, Default)]
pub struct MockSubscriberRepository {
   subscribers: Arc<Mutex<Vec<Subscriber>>>,
   failure:     Failure,
}

impl MockSubscriberRepository {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn add_subscriber(&self, subscriber: Subscriber) {
      self.subscribers.lock().unwrap().push(subscriber);
   }

   /// 以降のクエリを失敗させる
   pub fn fail_with(&self, message: &str) {
      *self.failure.lock().unwrap() = Some(message.to_string());
   }
}

#[async_trait]
impl SubscriberRepository for MockSubscriberRepository {
   async fn find_all(&self) -> Result<Vec<Subscriber>, InfraError> {
      check(&self.failure)?;
      Ok(self.subscribers.lock().unwrap().clone())
   }
}

// ===== MockBloqueioRepository =====

#[derive(Clone, Default)]
pub struct MockBloqueioRepository {
   bloqueios: Arc<Mutex<Vec<Bloqueio>>>,
   failure:   Failure,
}

impl MockBloqueioRepository {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn add_bloqueio(&self, bloqueio: Bloqueio) {
      self.bloqueios.lock().unwrap().push(bloqueio);
   }

   pub fn fail_with(&self, message: &str) {
      *self.failure.lock().unwrap() = Some(message.to_string());
   }

   fn filter(&self, predicate: impl Fn(&Bloqueio) -> bool) -> Result<Vec<Bloqueio>, InfraError> {
      check(&self.failure)?;
      Ok(self
         .bloqueios
         .lock()
         .unwrap()
         .iter()
         .filter(|b| predicate(*b))
         .cloned()
         .collect())
   }
}

#[async_trait]
impl BloqueioRepository for MockBloqueioRepository {
   async fn find_by_vencimento(&self, date: &ReportDate) -> Result<Vec<Bloqueio>, InfraError> {
      let key = date.as_key();
      self.filter(|b| b.vencimento.as_deref() == Some(key.as_str()))
   }

   async fn find_by_data_bloqueio(&self, date: &ReportDate) -> Result<Vec<Bloqueio>, InfraError> {
      let key = date.as_key();
      self.filter(|b| b.data_bloqueio.as_deref() == Some(key.as_str()))
   }

   async fn find_opened_on_or_before(
      &self,
      cutoff: &ReportDate,
   ) -> Result<Vec<Bloqueio>, InfraError> {
      let key = cutoff.as_key();
      self.filter(|b| {
         b.data_bloqueio
            .as_deref()
            .is_some_and(|opened| opened <= key.as_str())
      })
   }
}

// ===== MockTratativaRepository =====

#[derive(Clone, Default)]
pub struct MockTratativaRepository {
   tratativas: Arc<Mutex<Vec<Tratativa>>>,
   failure:    Failure,
}

impl MockTratativaRepository {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn add_tratativa(&self, tratativa: Tratativa) {
      self.tratativas.lock().unwrap().push(tratativa);
   }

   pub fn fail_with(&self, message: &str) {
      *self.failure.lock().unwrap() = Some(message.to_string());
   }
}

#[async_trait]
impl TratativaRepository for MockTratativaRepository {
   async fn find_by_data_liberacao(
      &self,
      date: &ReportDate,
   ) -> Result<Vec<Tratativa>, InfraError> {
      check(&self.failure)?;
      let key = date.as_key();
      Ok(self
         .tratativas
         .lock()
         .unwrap()
         .iter()
         .filter(|t| t.data_liberacao.as_deref() == Some(key.as_str()))
         .cloned()
         .collect())
   }

   async fn find_all(&self) -> Result<Vec<Tratativa>, InfraError> {
      check(&self.failure)?;
      Ok(self.tratativas.lock().unwrap().clone())
   }
}

// ===== MockFinalizacaoRepository =====

#[derive(Clone, Default)]
pub struct MockFinalizacaoRepository {
   finalizacoes: Arc<Mutex<Vec<Finalizacao>>>,
   failure:      Failure,
}

impl MockFinalizacaoRepository {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn add_finalizacao(&self, finalizacao: Finalizacao) {
      self.finalizacoes.lock().unwrap().push(finalizacao);
   }

   pub fn fail_with(&self, message: &str) {
      *self.failure.lock().unwrap() = Some(message.to_string());
   }
}

#[async_trait]
impl FinalizacaoRepository for MockFinalizacaoRepository {
   async fn find_by_data_finalizacao(
      &self,
      date: &ReportDate,
   ) -> Result<Vec<Finalizacao>, InfraError> {
      check(&self.failure)?;
      let key = date.as_key();
      Ok(self
         .finalizacoes
         .lock()
         .unwrap()
         .iter()
         .filter(|f| f.data_finalizacao.as_deref() == Some(key.as_str()))
         .cloned()
         .collect())
   }
}

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `fail_with` を呼ぶと以降の送信は `SendFailed` になる（記録もしない）。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
   sent:    Arc<Mutex<Vec<EmailMessage>>>,
   failure: Failure,
}

impl MockNotificationSender {
   pub fn new() -> Self {
      Self::default()
   }

   /// 送信済みメールを送信順で返す
   pub fn sent_emails(&self) -> Vec<EmailMessage> {
      self.sent.lock().unwrap().clone()
   }

   pub fn fail_with(&self, message: &str) {
      *self.failure.lock().unwrap() = Some(message.to_string());
   }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
   async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
      if let Some(message) = self.failure.lock().unwrap().as_deref() {
         return Err(NotificationError::SendFailed(message.to_string()));
      }
      self.sent.lock().unwrap().push(email.clone());
      Ok(())
   }
}
