use super::prompt::SYSTEM_PROMPT;
use crate::attributes::JobAttributes;
use crate::cache::{CacheKey, CacheManager, CacheStats};
use crate::config::{AppConfig, QueryConfig};
use crate::credits::CreditLedger;
use crate::generator::{OpenAiGenerator, StructuredGenerator};
use crate::structured::{join_errors, OutputValidator};
use crate::{Error, ErrorContext, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Identity of the authenticated user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    /// Privileged callers may force recomputation. Forced runs are billed.
    pub bypass_cache: bool,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            bypass_cache: false,
        }
    }

    pub fn bypassing_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }
}

/// Debit, model call and refund for one uncached query.
struct MeteredExtractor {
    ledger: Arc<dyn CreditLedger>,
    generator: Arc<dyn StructuredGenerator>,
    validator: OutputValidator,
    cost: i64,
    ai_timeout: Duration,
}

impl MeteredExtractor {
    async fn run(&self, user_id: &str, query: &str) -> Result<JobAttributes> {
        let balance = self
            .ledger
            .balance(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {}", user_id)))?;

        if balance < self.cost {
            debug!(user_id, balance, cost = self.cost, "insufficient credits");
            return Err(Error::insufficient_credits());
        }

        // Debit before the model call; a failed call is refunded below.
        let generator = self.generator.name();
        if self.cost > 0 {
            self.ledger.adjust(user_id, -self.cost).await?;
            info!(user_id, amount = self.cost, generator, "credits debited");
        }

        // A panicking generator is a failed call like any other and is refunded.
        let outcome = AssertUnwindSafe(self.extract(query))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(Error::internal_with_context(
                    "model call panicked",
                    ErrorContext::new().with_source(generator),
                ))
            });

        match outcome {
            Ok(attributes) => Ok(attributes),
            Err(cause) => {
                let mut context = ErrorContext::new()
                    .with_source("generator")
                    .with_details(cause.to_string());
                if self.cost > 0 {
                    match self.ledger.adjust(user_id, self.cost).await {
                        Ok(()) => info!(user_id, amount = self.cost, generator, "credits refunded"),
                        Err(refund_err) => {
                            error!(
                                user_id,
                                amount = self.cost,
                                error = %refund_err,
                                "credit refund failed"
                            );
                            context = context
                                .with_details(format!("{}; refund failed: {}", cause, refund_err));
                        }
                    }
                }
                Err(Error::internal_with_context("Failed to process query", context))
            }
        }
    }

    async fn extract(&self, query: &str) -> Result<JobAttributes> {
        let schema = self.validator.schema();
        let value = tokio::time::timeout(
            self.ai_timeout,
            self.generator.generate(SYSTEM_PROMPT, schema, query),
        )
        .await
        .map_err(|_| {
            Error::internal_with_context(
                "model call timed out",
                ErrorContext::new().with_details(format!("after {:?}", self.ai_timeout)),
            )
        })??;

        self.validator.parse_value(value).map_err(|errors| {
            Error::internal_with_context(
                "model output does not match schema",
                ErrorContext::new().with_details(join_errors(&errors)),
            )
        })
    }
}

/// Natural-language candidate search: cached, credit-metered attribute extraction.
///
/// A cache hit returns the stored attributes without touching the ledger or
/// the model. A miss checks the balance, debits the query cost, calls the
/// model, and refunds the cost if the call fails.
pub struct NaturalLanguageQueryService {
    cache: CacheManager,
    meter: Arc<MeteredExtractor>,
    config: QueryConfig,
}

impl NaturalLanguageQueryService {
    pub fn builder(
        ledger: Arc<dyn CreditLedger>,
        generator: Arc<dyn StructuredGenerator>,
    ) -> QueryServiceBuilder {
        QueryServiceBuilder::new(ledger, generator)
    }

    /// Wires the service from process configuration: REST KV cache when
    /// configured, OpenAI-compatible generator.
    pub fn from_app_config(config: &AppConfig, ledger: Arc<dyn CreditLedger>) -> Result<Self> {
        let generator = Arc::new(OpenAiGenerator::new(&config.generator)?);
        Self::builder(ledger, generator)
            .cache(CacheManager::from_config(config.kv_store.as_ref()))
            .config(config.query.clone())
            .ai_timeout(config.generator.timeout())
            .build()
    }

    /// Extracts [`JobAttributes`] from `query` on behalf of `caller`.
    pub async fn natural_language_query(
        &self,
        caller: &Caller,
        query: &str,
    ) -> Result<JobAttributes> {
        if caller.user_id.trim().is_empty() {
            return Err(Error::unauthorized("authentication required"));
        }
        if query.trim().is_empty() {
            return Err(Error::invalid_input(
                "query must not be empty",
                ErrorContext::new().with_field_path("query"),
            ));
        }

        let key = self.key_for(query);
        let span = info_span!(
            "natural_language_query",
            request_id = %Uuid::new_v4(),
            user_id = %caller.user_id
        );

        async {
            let meter = Arc::clone(&self.meter);
            let user_id = caller.user_id.clone();
            let query = query.to_string();
            // Spawned so a debit is always settled even if this request is dropped.
            let compute = move || async move {
                match tokio::spawn(async move { meter.run(&user_id, &query).await }).await {
                    Ok(result) => result,
                    Err(join_err) => Err(Error::internal_with_context(
                        "Failed to process query",
                        ErrorContext::new().with_details(join_err.to_string()),
                    )),
                }
            };

            let outcome = self
                .cache
                .get_or_compute(&key, self.config.cache_ttl(), caller.bypass_cache, compute)
                .await?;

            if outcome.served_from_cache {
                let delay = self.config.hit_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            info!(cached = outcome.served_from_cache, "query answered");
            Ok::<_, Error>(outcome.into_inner())
        }
        .instrument(span)
        .await
    }

    /// Current credit balance of `caller`.
    pub async fn credits(&self, caller: &Caller) -> Result<i64> {
        self.meter
            .ledger
            .balance(&caller.user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {}", caller.user_id)))
    }

    /// Drops any cached answer for `query`. Never fails.
    pub async fn invalidate(&self, query: &str) {
        self.cache.delete(&self.key_for(query)).await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn key_for(&self, query: &str) -> CacheKey {
        CacheKey::derive(&self.config.key_prefix, query)
    }
}

pub struct QueryServiceBuilder {
    ledger: Arc<dyn CreditLedger>,
    generator: Arc<dyn StructuredGenerator>,
    cache: CacheManager,
    config: QueryConfig,
    ai_timeout: Duration,
}

impl QueryServiceBuilder {
    pub fn new(ledger: Arc<dyn CreditLedger>, generator: Arc<dyn StructuredGenerator>) -> Self {
        Self {
            ledger,
            generator,
            cache: CacheManager::disabled(),
            config: QueryConfig::default(),
            ai_timeout: Duration::from_secs(30),
        }
    }

    /// Defaults to a disabled cache.
    pub fn cache(mut self, cache: CacheManager) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ai_timeout(mut self, timeout: Duration) -> Self {
        self.ai_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<NaturalLanguageQueryService> {
        let validator = OutputValidator::for_type::<JobAttributes>().map_err(|e| {
            Error::internal_with_context(
                "cannot compile JobAttributes schema",
                ErrorContext::new().with_details(e.to_string()),
            )
        })?;
        if self.config.credit_cost < 0 {
            return Err(Error::configuration_with_context(
                "credit cost must not be negative",
                ErrorContext::new().with_field_path("query.credit_cost"),
            ));
        }

        Ok(NaturalLanguageQueryService {
            cache: self.cache,
            meter: Arc::new(MeteredExtractor {
                ledger: self.ledger,
                generator: self.generator,
                validator,
                cost: self.config.credit_cost,
                ai_timeout: self.ai_timeout,
            }),
            config: self.config,
        })
    }
}
