// src/services/change_feed.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::models::product::Product;

/// Evento de alteração de produto consumido pelo indexador de busca.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ProductChange {
    Upsert { product: Product },
    #[serde(rename_all = "camelCase")]
    Delete { product_id: Uuid, company_id: Uuid },
}

impl ProductChange {
    pub fn product_id(&self) -> Uuid {
        match self {
            ProductChange::Upsert { product } => product.id,
            ProductChange::Delete { product_id, .. } => *product_id,
        }
    }
}

/// Destino dos eventos (fila de mensagens, log, ...).
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    async fn publish(&self, change: ProductChange) -> anyhow::Result<()>;
}

/// Publicador padrão: só registra o evento no log.
pub struct TracingPublisher;

#[async_trait]
impl ChangePublisher for TracingPublisher {
    async fn publish(&self, change: ProductChange) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&change)?;
        tracing::info!(product_id = %change.product_id(), %payload, "📤 alteração de produto publicada");
        Ok(())
    }
}

/// Dispara a publicação numa task separada. Falhas são apenas logadas:
/// a requisição que originou a alteração nunca espera nem falha por isso.
pub fn spawn_publish(publisher: &Arc<dyn ChangePublisher>, change: ProductChange) {
    let publisher = Arc::clone(publisher);
    tokio::spawn(async move {
        let product_id = change.product_id();
        if let Err(e) = publisher.publish(change).await {
            tracing::warn!(%product_id, "falha ao publicar alteração de produto: {:#}", e);
        }
    });
}
