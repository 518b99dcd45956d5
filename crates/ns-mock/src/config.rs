//! Mock configuration.

use crate::domain::{ApiGeneration, ExitMessagePolicy, MessageTemplates, NonceReusePolicy};
use std::env;

/// Behavior chosen when a [`crate::MockManager`] is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockConfig {
    /// API generation to emulate
    pub generation: ApiGeneration,

    /// Whether a verified login nonce may be reused
    pub nonce_policy: NonceReusePolicy,

    /// Message bodies; the generation's defaults when `None`
    pub templates: Option<MessageTemplates>,
}

impl MockConfig {
    /// Configuration for one generation with its default templates.
    pub fn for_generation(generation: ApiGeneration) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NS_API_GENERATION`: `v2` or `v3` (default: v3)
    /// - `NS_SINGLE_USE_NONCES`: consume login nonces (default: false)
    pub fn from_env() -> Self {
        Self {
            generation: env::var("NS_API_GENERATION")
                .ok()
                .and_then(|v| ApiGeneration::parse(&v))
                .unwrap_or_default(),

            nonce_policy: env::var("NS_SINGLE_USE_NONCES")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .map(|single| {
                    if single {
                        NonceReusePolicy::SingleUse
                    } else {
                        NonceReusePolicy::Reusable
                    }
                })
                .unwrap_or_default(),

            templates: None,
        }
    }

    /// Templates in effect.
    pub fn templates(&self) -> MessageTemplates {
        self.templates
            .clone()
            .unwrap_or_else(|| self.generation.templates())
    }

    pub fn exit_message_policy(&self) -> ExitMessagePolicy {
        self.generation.exit_message_policy()
    }
}
