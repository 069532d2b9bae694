//! # insight-runtime
//!
//! Runtime text-generation providers for the market dashboard.
//!
//! ## Providers
//!
//! - **Ollama** (default): local inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use insight_runtime::{OllamaProvider, RiskAnalyst, GenerationOptions};
//!
//! let provider = Arc::new(OllamaProvider::from_env());
//! let analyst = RiskAnalyst::new(provider, GenerationOptions::from_env());
//! let report = analyst.assess(&brief).await?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use insight_core::{
    AnalysisReport, AssetBrief, GenerationOptions, InsightError, LlmProvider, Message, Result,
    RiskAnalyst, Role,
};
