//! # insight-core
//!
//! Provider-agnostic text generation and the risk/return narrative built on it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    RiskAnalyst                       │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────┐  │
//! │  │   Prompt    │──│ LlmProvider  │──│   Parser    │  │
//! │  │  (brief)    │  │  (Strategy)  │  │ (JSON reply)│  │
//! │  └─────────────┘  └──────────────┘  └─────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the analyst run against Ollama or any other
//! backend without changing the prompt or parsing logic.

pub mod analysis;
pub mod error;
pub mod message;
pub mod provider;

pub use analysis::{AnalysisReport, AssetBrief, Level, RiskAnalyst, RiskAssessment};
pub use error::{InsightError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
