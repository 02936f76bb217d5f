// src/services/history_service.rs
use crate::errors::BrandforgeError;
use crate::models::HistoryItem;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

/// Session-scoped history and favorites, backed by Redis. Items expire after
/// 24 hours; the per-session index only holds ids, so expired entries are
/// skipped on read.
pub struct HistoryService {
    client: Client,
}

impl HistoryService {
    pub async fn new(redis_url: &str) -> Result<Self, BrandforgeError> {
        let client = Client::open(redis_url).map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        // Test connection
        let mut conn = client
            .get_async_connection()
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        Ok(Self { client })
    }

    pub async fn store_item(&self, item: &HistoryItem) -> Result<(), BrandforgeError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        let key = format!("history:{}", item.id);
        let value = serde_json::to_string(item)
            .map_err(|e| BrandforgeError::Serialization(e.to_string()))?;

        // Store with 24 hour expiration
        conn.set_ex::<_, _, ()>(&key, value, 86400)
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        // Add to session index
        let session_key = format!("session:{}:history", item.session_id);
        conn.sadd::<_, _, ()>(&session_key, item.id.to_string())
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        Ok(())
    }

    pub async fn get_item(&self, item_id: &Uuid) -> Result<HistoryItem, BrandforgeError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        let key = format!("history:{}", item_id);
        let value: String = conn
            .get(&key)
            .await
            .map_err(|e| BrandforgeError::Redis(format!("History item not found: {}", e)))?;

        serde_json::from_str(&value).map_err(|e| BrandforgeError::Serialization(e.to_string()))
    }

    /// All stored items for a session, newest first.
    pub async fn list_session(&self, session_id: &Uuid) -> Result<Vec<HistoryItem>, BrandforgeError> {
        let session_key = format!("session:{}:history", session_id);
        self.resolve_ids(&session_key).await
    }

    /// Flips the favorite state of an item within a session and returns the
    /// new state. The item must still exist in history.
    pub async fn toggle_favorite(
        &self,
        session_id: &Uuid,
        item_id: &Uuid,
    ) -> Result<bool, BrandforgeError> {
        self.get_item(item_id).await?;

        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        let favorites_key = format!("session:{}:favorites", session_id);
        let is_favorite: bool = conn
            .sismember(&favorites_key, item_id.to_string())
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        if is_favorite {
            conn.srem::<_, _, ()>(&favorites_key, item_id.to_string())
                .await
                .map_err(|e| BrandforgeError::Redis(e.to_string()))?;
        } else {
            conn.sadd::<_, _, ()>(&favorites_key, item_id.to_string())
                .await
                .map_err(|e| BrandforgeError::Redis(e.to_string()))?;
        }

        Ok(!is_favorite)
    }

    pub async fn list_favorites(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<HistoryItem>, BrandforgeError> {
        let favorites_key = format!("session:{}:favorites", session_id);
        self.resolve_ids(&favorites_key).await
    }

    async fn resolve_ids(&self, index_key: &str) -> Result<Vec<HistoryItem>, BrandforgeError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        let ids: Vec<String> = conn
            .smembers(index_key)
            .await
            .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let key = format!("history:{}", id);
            // Items expire independently of the index; skip the gone ones.
            let value: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| BrandforgeError::Redis(e.to_string()))?;

            if let Some(value) = value {
                let item: HistoryItem = serde_json::from_str(&value)
                    .map_err(|e| BrandforgeError::Serialization(e.to_string()))?;
                items.push(item);
            }
        }

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}
