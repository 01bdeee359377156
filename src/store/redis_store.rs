// Production `KeyValueStore` backed by Redis (SPEC_FULL.md section 6.1):
// `HSET`/`HGETALL`/`HDEL` for session hashes, `ZADD`/`ZREM`/`ZRANGEBYSCORE`
// for the matchmaking and tournament queues, and `MULTI`/`EXEC` (via
// `redis::pipe().atomic()`) for the transactional commits the Dispatcher
// and Matchmaker require.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::{CoreError, ErrorCode};
use crate::store::{KeyValueStore, StoreOp};

pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn connect(url: &str) -> Result<Self, CoreError> {
        let client = redis::Client::open(url).map_err(|e| CoreError::new(ErrorCode::InternalError, format!("could not build redis client: {e}")))?;
        Ok(Self { client })
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, CoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CoreError::new(ErrorCode::InternalError, format!("redis connection failed: {e}")))
    }
}

fn store_err(e: redis::RedisError) -> CoreError {
    CoreError::new(ErrorCode::InternalError, format!("redis error: {e}"))
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn hash_get_all(&self, key: &str) -> Result<Option<Vec<(String, String)>>, CoreError> {
        let mut conn = self.conn().await?;
        let fields: Vec<(String, String)> = conn.hgetall(key).await.map_err(store_err)?;
        if fields.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fields))
        }
    }

    async fn hash_set(&self, key: &str, fields: Vec<(String, String)>) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.hset_multiple(key, &fields).await.map_err(store_err)?;
        Ok(())
    }

    async fn hash_delete(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.del(key).await.map_err(store_err)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let mut conn = self.conn().await?;
        conn.get(key).await.map_err(store_err)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        match ttl_secs {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl).await.map_err(store_err)?;
            }
            None => {
                let _: () = conn.set(key, value).await.map_err(store_err)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.del(key).await.map_err(store_err)?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.zadd(key, member, score).await.map_err(store_err)?;
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.zrem(key, member).await.map_err(store_err)?;
        Ok(())
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<(String, f64)>, CoreError> {
        let mut conn = self.conn().await?;
        let members: Vec<(String, f64)> = conn.zrangebyscore_withscores(key, min, max).await.map_err(store_err)?;
        Ok(members)
    }

    async fn zcard(&self, key: &str) -> Result<u64, CoreError> {
        let mut conn = self.conn().await?;
        conn.zcard(key).await.map_err(store_err)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), CoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.expire(key, ttl_secs as i64).await.map_err(store_err)?;
        Ok(())
    }

    async fn transaction(&self, ops: Vec<StoreOp>) -> Result<(), CoreError> {
        if ops.is_empty() {
            return Err(CoreError::new(ErrorCode::InternalError, "empty transaction"));
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in ops {
            match op {
                StoreOp::HashSet { key, fields } => {
                    pipe.hset_multiple(key, &fields);
                }
                StoreOp::HashDelete { key } => {
                    pipe.del(key);
                }
                StoreOp::ZAdd { key, member, score } => {
                    pipe.zadd(key, member, score);
                }
                StoreOp::ZRem { key, member } => {
                    pipe.zrem(key, member);
                }
                StoreOp::Expire { key, ttl_secs } => {
                    pipe.expire(key, ttl_secs as i64);
                }
                StoreOp::Set { key, value, ttl_secs } => match ttl_secs {
                    Some(ttl) => {
                        pipe.set_ex(key, value, ttl);
                    }
                    None => {
                        pipe.set(key, value);
                    }
                },
                StoreOp::Delete { key } => {
                    pipe.del(key);
                }
            }
        }
        let mut conn = self.conn().await?;
        let _: () = pipe.query_async(&mut conn).await.map_err(store_err)?;
        Ok(())
    }
}
