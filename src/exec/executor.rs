//! The execution loop composing builder, resolver, and processor over a
//! transport.
//!
//! One logical request runs as a strictly sequential loop: build once, then
//! send and classify until a non-redirect response is reached, then
//! normalize. Hops are never parallel; hop N+1 never starts before hop N has
//! been fully classified. The loop carries the current request as its
//! accumulator, so the hop limit is a plain guard rather than recursion
//! depth. Transport failures are terminal for the invocation; this layer
//! never retries.

use crate::base::error::HopError;
use crate::base::policy::ExecutionPolicy;
use crate::exec::builder::{RequestBuilder, RequestConfig};
use crate::exec::processor::{ProcessedResponse, ResponseProcessor};
use crate::exec::redirect::{RedirectDecision, RedirectResolver};
use crate::exec::ExecutionContext;
use crate::http::request::HttpRequest;
use crate::transport::{Transport, TransportError};
use std::time::Instant;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

/// Executes one logical HTTP request end to end.
pub struct HttpExecutor<T: Transport> {
    transport: T,
    builder: RequestBuilder,
    resolver: RedirectResolver,
    processor: ResponseProcessor,
}

impl<T: Transport> HttpExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, ExecutionPolicy::default())
    }

    pub fn with_policy(transport: T, policy: ExecutionPolicy) -> Self {
        Self {
            transport,
            builder: RequestBuilder::new(policy.clone()),
            resolver: RedirectResolver::new(policy.clone()),
            processor: ResponseProcessor::new(policy),
        }
    }

    /// Access the underlying transport (a scripted transport in tests).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `config` to completion.
    pub async fn execute(
        &self,
        config: &RequestConfig,
        context: &ExecutionContext,
    ) -> Result<ProcessedResponse, HopError> {
        self.execute_with_cancel(config, context, CancellationToken::new())
            .await
    }

    /// Execute `config`, aborting the in-flight hop if `cancel` fires. An
    /// aborted hop is terminal; no further hops are attempted.
    pub async fn execute_with_cancel(
        &self,
        config: &RequestConfig,
        context: &ExecutionContext,
        cancel: CancellationToken,
    ) -> Result<ProcessedResponse, HopError> {
        let started_at = OffsetDateTime::now_utc();
        let started = Instant::now();

        let mut request = self.builder.build(config)?;
        tracing::debug!(
            url = %request.url,
            method = %request.method,
            execution_id = %context.execution_id,
            "starting execution"
        );

        loop {
            let outcome = tokio::select! {
                // Cancellation wins over a simultaneously-ready response.
                biased;
                _ = cancel.cancelled() => {
                    return Err(HopError::abort("execution cancelled")
                        .with_context("url", request.url.as_str())
                        .with_redirects(request.metadata.redirect_chain.clone()));
                }
                outcome = tokio::time::timeout(request.timeout, self.transport.send(&request)) => outcome,
            };

            let response = match outcome {
                Err(_elapsed) => {
                    return Err(HopError::timeout("request timed out")
                        .with_context("url", request.url.as_str())
                        .with_context("timeout_ms", request.timeout.as_millis() as u64)
                        .with_redirects(request.metadata.redirect_chain.clone()));
                }
                Ok(Err(e)) => return Err(map_transport_error(e, &request)),
                Ok(Ok(response)) => response,
            };

            match self.resolver.resolve(&response, &request) {
                RedirectDecision::NotRedirect => {
                    return self
                        .processor
                        .process(response, &request, context, started_at, started)
                        .await;
                }
                RedirectDecision::Blocked(err) => {
                    tracing::warn!(
                        code = %err.code,
                        url = %request.url,
                        "redirect blocked"
                    );
                    return Err(err);
                }
                RedirectDecision::Followed(next) => {
                    request = *next;
                }
            }
        }
    }
}

fn map_transport_error(error: TransportError, request: &HttpRequest) -> HopError {
    let base = match error {
        TransportError::TimedOut => HopError::timeout("transport timed out"),
        TransportError::Aborted => HopError::abort("transport aborted"),
        other => HopError::network("transport failed").with_source(other),
    };
    base.with_context("url", request.url.as_str())
        .with_redirects(request.metadata.redirect_chain.clone())
}
