//! Redis-backed invalidation for a single node or a cluster.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::{CacheError, CacheInvalidator, EvictionOutcome};

#[derive(Clone)]
enum RedisConnection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

/// Deletes keys from Redis. One configured node gives a managed single-node
/// connection; several give a cluster connection.
#[derive(Clone)]
pub struct RedisCacheInvalidator {
    conn: RedisConnection,
}

impl RedisCacheInvalidator {
    pub async fn connect(nodes: &[String]) -> Result<Self, CacheError> {
        let conn = match nodes {
            [] => return Err(CacheError::Connection("no redis nodes configured".to_string())),
            [node] => {
                let client = redis::Client::open(node.as_str())?;
                RedisConnection::Single(ConnectionManager::new(client).await?)
            }
            nodes => {
                let client = ClusterClient::new(nodes.to_vec())?;
                RedisConnection::Cluster(client.get_async_connection().await?)
            }
        };

        info!(nodes = nodes.len(), "Connected to redis");
        Ok(Self { conn })
    }

    /// Round-trip a PING so startup fails fast when the cache is unreachable.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let reply: String = match self.conn.clone() {
            RedisConnection::Single(mut conn) => redis::cmd("PING").query_async(&mut conn).await?,
            RedisConnection::Cluster(mut conn) => redis::cmd("PING").query_async(&mut conn).await?,
        };
        if reply.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::Unavailable(format!("unexpected PING reply: {}", reply)))
        }
    }

    async fn delete(&self, key: &str) -> Result<u64, CacheError> {
        let removed: u64 = match self.conn.clone() {
            RedisConnection::Single(mut conn) => conn.del(key).await?,
            RedisConnection::Cluster(mut conn) => conn.del(key).await?,
        };
        Ok(removed)
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn evict(&self, key: &str) -> EvictionOutcome {
        match self.delete(key).await {
            Ok(removed) => {
                debug!(key, removed, "Evicted cache key");
                EvictionOutcome::Evicted { removed }
            }
            Err(e) => EvictionOutcome::Failed(e),
        }
    }
}
