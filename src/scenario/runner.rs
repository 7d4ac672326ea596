//! Scenario orchestration: publish once, then poll and check each enabled
//! read-back target.

use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::config::RelayConfig;
use crate::gateway::GatewayClient;
use crate::model::{BlobRecord, TableEntityRecord};
use crate::observability::metrics;
use crate::resilience::retries::RetryObserver;
use crate::resilience::{PollExecutor, RetryPolicy};
use crate::scenario::assertions::{check_blob, check_table_entity, Expected};
use crate::scenario::{ScenarioError, ScenarioReport, Target};

/// Which targets to check and how to poll them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOptions {
    pub include_function_app: bool,
    pub include_logic_app: bool,
    /// Provenance every record must carry.
    pub expected_via: String,
    pub policy: RetryPolicy,
}

impl ScenarioOptions {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            include_function_app: config.scenario.include_function_app,
            include_logic_app: config.scenario.include_logic_app,
            expected_via: config.scenario.expected_via.clone(),
            policy: config.polling.to_policy(),
        }
    }
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            include_function_app: true,
            include_logic_app: true,
            expected_via: "Service Bus".to_string(),
            policy: RetryPolicy::default(),
        }
    }
}

pub struct ScenarioRunner {
    gateway: GatewayClient,
    options: ScenarioOptions,
    observer: Option<RetryObserver>,
}

impl ScenarioRunner {
    pub fn new(gateway: GatewayClient, options: ScenarioOptions) -> Self {
        Self {
            gateway,
            options,
            observer: None,
        }
    }

    /// Forward every poll retry to `observer`.
    pub fn on_retry(mut self, observer: RetryObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &ScenarioOptions {
        &self.options
    }

    /// Publish `message` and verify every enabled target.
    pub async fn run(&self, message: &str) -> Result<ScenarioReport, ScenarioError> {
        let start = Instant::now();
        let result = self.run_inner(message, start).await;
        metrics::record_scenario(result.is_ok(), start);

        match &result {
            Ok(report) => tracing::info!(id = %report.id, elapsed = ?report.elapsed, "Scenario passed"),
            Err(e) => tracing::error!(error = %e, "Scenario failed"),
        }
        result
    }

    async fn run_inner(&self, message: &str, start: Instant) -> Result<ScenarioReport, ScenarioError> {
        let published = self
            .gateway
            .publish_message(message)
            .await
            .map_err(ScenarioError::Publish)?;
        let id = published.id.trim().to_string();
        if id.is_empty() {
            return Err(ScenarioError::EmptyId);
        }

        let expected = Expected {
            id: &id,
            message,
            via: &self.options.expected_via,
        };

        let table_entity = if self.options.include_function_app {
            let record: TableEntityRecord = self.poll(Target::TableEntity, &id).await?;
            check_table_entity(&record, expected)?;
            Some(record)
        } else {
            tracing::debug!("Table entity check disabled");
            None
        };

        let blob = if self.options.include_logic_app {
            let record: BlobRecord = self.poll(Target::Blob, &id).await?;
            check_blob(&record, expected)?;
            Some(record)
        } else {
            tracing::debug!("Blob check disabled");
            None
        };

        Ok(ScenarioReport {
            id,
            message: message.to_string(),
            table_entity,
            blob,
            elapsed: start.elapsed(),
        })
    }

    async fn poll<T: DeserializeOwned>(&self, target: Target, id: &str) -> Result<T, ScenarioError> {
        let path = target.path(id);
        let mut executor = PollExecutor::new(self.options.policy.clone()).with_label(target.collection());
        if let Some(observer) = &self.observer {
            let observer = observer.clone();
            executor = executor.on_retry(move |event| observer(event));
        }

        tracing::info!(target_resource = %target.collection(), id = %id, "Waiting for record");
        executor
            .run(|_| self.gateway.poll_json::<T>(&path))
            .await
            .map_err(|source| ScenarioError::Poll { target, source })
    }
}
