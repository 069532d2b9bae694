//! Risk / Return Narrative
//!
//! Builds a prompt for one asset, sends it to a generative provider and turns
//! the reply into a structured assessment. One request per call: no retry and
//! no caching.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InsightError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};

const SYSTEM_PROMPT: &str = "You are a cryptocurrency market analyst. \
You give short, balanced assessments and always answer with a single JSON object. \
Your output is informational and is not financial advice.";

/// The facts about an asset that go into the prompt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetBrief {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub price_usd: Decimal,
    pub market_cap: Option<Decimal>,
}

/// Category used for both risk and return potential
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("Low"),
            Self::Medium => f.write_str("Medium"),
            Self::High => f.write_str("High"),
        }
    }
}

impl FromStr for Level {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "low" | "very low" => return Ok(Self::Low),
            "medium" | "moderate" | "mid" => return Ok(Self::Medium),
            "high" | "very high" => return Ok(Self::High),
            _ => {}
        }

        // Hedged answers such as "medium-high" land on the middle bucket.
        if s.contains("medium") || s.contains("moderate") {
            Ok(Self::Medium)
        } else if s.contains("high") {
            Ok(Self::High)
        } else if s.contains("low") {
            Ok(Self::Low)
        } else {
            Err(InsightError::Parse(format!("unknown level '{s}'")))
        }
    }
}

/// Structured result of one analysis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: Level,
    pub return_potential: Level,
    pub justification: String,
}

/// Assessment plus request metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub coin_id: String,
    pub symbol: String,
    pub model: String,
    pub assessment: RiskAssessment,
    pub generated_at: DateTime<Utc>,
}

/// Prompt text for one asset
pub fn build_prompt(brief: &AssetBrief) -> String {
    let market_cap = brief
        .market_cap
        .map_or_else(|| "an unknown market capitalization".to_string(), |cap| {
            format!("a market capitalization of about {}", format_usd_compact(cap))
        });

    format!(
        "Assess the risk level and return potential of {name} ({symbol}), \
currently trading at approximately {price} with {market_cap}.\n\n\
Reply with only this JSON object:\n\
{{\"riskLevel\": \"Low|Medium|High\", \"returnPotential\": \"Low|Medium|High\", \
\"justification\": \"two or three sentences\"}}",
        name = brief.name,
        symbol = brief.symbol.to_uppercase(),
        price = format_usd(brief.price_usd),
    )
}

/// Parse a provider reply into an assessment.
///
/// Accepts a bare JSON object or one wrapped in prose or code fences, and
/// both camelCase and snake_case keys.
pub fn parse_assessment(text: &str) -> Result<RiskAssessment> {
    let json = extract_json_object(text)
        .ok_or_else(|| InsightError::Parse("no JSON object in response".into()))?;

    let raw: RawAssessment =
        serde_json::from_str(json).map_err(|e| InsightError::Parse(e.to_string()))?;

    let justification = raw.justification.trim().to_string();
    if justification.is_empty() {
        return Err(InsightError::Parse("empty justification".into()));
    }

    Ok(RiskAssessment {
        risk_level: raw.risk_level.parse()?,
        return_potential: raw.return_potential.parse()?,
        justification,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    #[serde(alias = "risk_level", alias = "risk")]
    risk_level: String,
    #[serde(alias = "return_potential", alias = "returnLevel")]
    return_potential: String,
    #[serde(alias = "reasoning", alias = "explanation")]
    justification: String,
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn format_usd(amount: Decimal) -> String {
    let rounded = if amount >= Decimal::ONE {
        amount.round_dp(2)
    } else {
        amount.round_dp(6).normalize()
    };
    format!("${rounded}")
}

fn format_usd_compact(amount: Decimal) -> String {
    let trillion = Decimal::from(1_000_000_000_000_i64);
    let billion = Decimal::from(1_000_000_000_i64);
    let million = Decimal::from(1_000_000_i64);

    if amount >= trillion {
        format!("${}T", (amount / trillion).round_dp(2))
    } else if amount >= billion {
        format!("${}B", (amount / billion).round_dp(2))
    } else if amount >= million {
        format!("${}M", (amount / million).round_dp(2))
    } else {
        format_usd(amount)
    }
}

/// Runs a single analysis request against a provider
pub struct RiskAnalyst {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl RiskAnalyst {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            provider,
            options: GenerationOptions { json_output: true, ..options },
        }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Ask the provider for a risk/return narrative of one asset
    pub async fn assess(&self, brief: &AssetBrief) -> Result<AnalysisReport> {
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, coin = %brief.coin_id, provider = self.provider.name(), "Requesting risk analysis");

        let messages = [Message::system(SYSTEM_PROMPT), Message::user(build_prompt(brief))];
        let completion = self.provider.complete(&messages, &self.options).await?;

        let assessment = parse_assessment(&completion.content).inspect_err(|e| {
            tracing::warn!(%request_id, "Unusable analysis response: {}", e);
        })?;

        Ok(AnalysisReport {
            request_id,
            coin_id: brief.coin_id.clone(),
            symbol: brief.symbol.to_uppercase(),
            model: completion.model,
            assessment,
            generated_at: Utc::now(),
        })
    }
}
