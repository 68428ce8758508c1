//! Retry decisions for failed broadcasts.
//!
//! # Responsibilities
//! - Decide whether a rejected broadcast is attempted again
//! - Ask the operator interactively, or retry automatically with backoff
//!
//! # Design Decisions
//! - Only broadcast rejections reach a policy; RPC, signing and confirmation
//!   errors are surfaced to the caller untouched
//! - A retry always rebuilds the intent with a fresh nonce; the policy never
//!   sees or reuses the old signed bytes
//! - The optional attempt cap is enforced by the submitter, not the policy

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::config::SubmissionConfig;

/// What the policy is told about a rejected broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastFailure {
    /// 1-based attempt number that failed.
    pub attempt: u32,
    /// Nonce the failed attempt was signed with.
    pub nonce: u64,
    /// Node's rejection message.
    pub reason: String,
}

/// Capability: decide whether to retry a rejected broadcast.
#[async_trait]
pub trait RetryPolicy: Send + Sync {
    async fn should_retry(&self, failure: &BroadcastFailure) -> bool;
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

#[async_trait]
impl RetryPolicy for NeverRetry {
    async fn should_retry(&self, _failure: &BroadcastFailure) -> bool {
        false
    }
}

/// Always retries after an exponential, jittered delay.
#[derive(Debug, Clone, Copy)]
pub struct AutoRetry {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl AutoRetry {
    /// Wait before re-broadcasting after `failure`.
    ///
    /// The base delay doubles with each failed attempt up to `max_delay_ms`,
    /// then up to a tenth of that is added at random.
    pub fn delay_for(&self, failure: &BroadcastFailure) -> Duration {
        let doublings = failure.attempt.saturating_sub(1).min(63);
        let ceiling = self
            .base_delay_ms
            .saturating_mul(1u64 << doublings)
            .min(self.max_delay_ms);
        let spread = rand::thread_rng().gen_range(0..=ceiling / 10);
        Duration::from_millis(ceiling + spread)
    }
}

#[async_trait]
impl RetryPolicy for AutoRetry {
    async fn should_retry(&self, failure: &BroadcastFailure) -> bool {
        let delay = self.delay_for(failure);
        tracing::debug!(
            attempt = failure.attempt,
            nonce = failure.nonce,
            delay_ms = delay.as_millis() as u64,
            "Retrying broadcast after backoff"
        );
        tokio::time::sleep(delay).await;
        true
    }
}

/// Asks "Do you want to try again (y/n)?" and reads one line.
///
/// Only `y` or `yes` (any case) retries; anything else, including EOF, aborts.
pub struct OperatorPrompt {
    input: Mutex<Box<dyn AsyncBufRead + Unpin + Send>>,
    output: Mutex<Box<dyn AsyncWrite + Unpin + Send>>,
}

impl OperatorPrompt {
    /// Prompt on stderr, answer on stdin.
    pub fn stdio() -> Self {
        Self::with_io(BufReader::new(tokio::io::stdin()), tokio::io::stderr())
    }

    pub fn with_io<R, W>(input: R, output: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }
}

impl std::fmt::Debug for OperatorPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorPrompt").finish_non_exhaustive()
    }
}

#[async_trait]
impl RetryPolicy for OperatorPrompt {
    async fn should_retry(&self, failure: &BroadcastFailure) -> bool {
        let prompt = format!(
            "Broadcast failed (attempt {}, nonce {}): {}\nDo you want to try again (y/n)? ",
            failure.attempt, failure.nonce, failure.reason
        );

        {
            let mut output = self.output.lock().await;
            if output.write_all(prompt.as_bytes()).await.is_err() || output.flush().await.is_err() {
                tracing::warn!("Could not write retry prompt; treating as decline");
                return false;
            }
        }

        let mut answer = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut answer).await {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

/// Build the policy selected by configuration.
pub fn policy_from_config(config: &SubmissionConfig) -> Arc<dyn RetryPolicy> {
    if config.interactive {
        Arc::new(OperatorPrompt::stdio())
    } else {
        Arc::new(AutoRetry {
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        })
    }
}
