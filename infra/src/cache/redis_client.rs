//! Redis cache client implementation
//!
//! A multiplexed async connection with bounded operations: every command runs
//! under `operation_timeout_ms` and transient failures are retried with
//! exponential backoff before surfacing as an error. Scripts that mutate
//! state are only retried when the server refused them outright.

use redis::{
    aio::MultiplexedConnection, AsyncCommands, Client, FromRedisValue, RedisError, RedisResult,
    Script,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use ro_shared::CacheConfig;

use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Whether an operation may be sent again after an ambiguous failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Running the command twice leaves the same state
    Safe,
    /// A second run could observe the effects of the first
    Unsafe,
}

/// Redis cache client with retry logic and per-operation deadlines
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using `config`
    ///
    /// Connection attempts are retried `max_retries` times, each bounded by
    /// `connection_timeout` seconds.
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.max_retries.max(1);
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result.map_err(InfrastructureError::Cache),
                Err(_) => Err(InfrastructureError::Timeout(connect_timeout.as_millis() as u64)),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Prefix `key` with the configured namespace
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Set a value with expiration time in seconds
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        let key = key.to_string();
        let value = value.to_string();
        self.execute_with_retry(Replay::Safe, move |mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
    }

    /// Get a value, `None` when the key is absent or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        let key = key.to_string();
        self.execute_with_retry(Replay::Safe, move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
    }

    /// Delete a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        let key = key.to_string();
        let deleted = self
            .execute_with_retry(Replay::Safe, move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Run a Lua script atomically on the server
    ///
    /// A timeout or dropped connection leaves it unknown whether the script
    /// ran, so those failures are returned rather than replayed.
    pub async fn run_script<T>(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<T, InfrastructureError>
    where
        T: FromRedisValue + Send + 'static,
    {
        let script = script.clone();
        let keys = keys.to_vec();
        let args = args.to_vec();
        self.execute_with_retry(Replay::Unsafe, move |mut conn| {
            let script = script.clone();
            let keys = keys.clone();
            let args = args.clone();
            Box::pin(async move {
                let mut invocation = script.prepare_invoke();
                for key in &keys {
                    invocation.key(key);
                }
                for arg in &args {
                    invocation.arg(arg);
                }
                invocation.invoke_async::<_, T>(&mut conn).await
            })
        })
        .await
    }

    /// Check if the Redis connection is healthy
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .execute_with_retry(Replay::Safe, |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Execute a Redis operation with a deadline and retry logic
    ///
    /// Failures accepted by [`should_retry`] for the given `replay` class are
    /// retried with exponential backoff; anything else fails immediately.
    async fn execute_with_retry<F, T>(
        &self,
        replay: Replay,
        operation: F,
    ) -> Result<T, InfrastructureError>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let max_attempts = self.config.max_retries.max(1);
        let deadline = Duration::from_millis(self.config.operation_timeout_ms.max(1));
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            let error = match timeout(deadline, operation(conn)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout(self.config.operation_timeout_ms),
            };

            if !should_retry(&error, replay) {
                error!("Redis operation failed: {}", error);
                return Err(error);
            }

            if attempts >= max_attempts {
                error!("Redis operation failed after {} attempts: {}", attempts, error);
                return Err(error);
            }

            warn!(
                "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                attempts, max_attempts, error, delay
            );
            sleep(Duration::from_millis(delay)).await;
            // Exponential backoff with cap at 5 seconds
            delay = (delay * 2).min(5000);
        }
    }
}

/// Whether a failed operation of the given replay class may be sent again
///
/// Unsafe operations are only retried when the server rejected them before
/// execution; a timeout or broken connection may hide a completed run.
pub(crate) fn should_retry(error: &InfrastructureError, replay: Replay) -> bool {
    match (error, replay) {
        (InfrastructureError::Timeout(_), Replay::Safe) => true,
        (InfrastructureError::Cache(e), Replay::Safe) => is_retriable_error(e),
        (InfrastructureError::Cache(e), Replay::Unsafe) => is_refused_before_execution(e),
        _ => false,
    }
}

fn is_refused_before_execution(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Whether a Redis error is transient and worth retrying
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    error.is_io_error()
        || error.is_timeout()
        || error.is_connection_dropped()
        || is_refused_before_execution(error)
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
