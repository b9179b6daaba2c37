/*!
 * Provider implementations for AI transcript review.
 *
 * This module contains the client interface and the OpenRouter-compatible
 * chat-completions implementation used to flag filler blocks for removal.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for chat-completion providers
///
/// This trait defines the interface that provider implementations follow,
/// allowing them to be used interchangeably by the cleanup service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

pub mod openrouter;
