pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod federal_contract;
pub mod financial;
pub mod foreign_labor;
pub mod past_performance;
pub mod result;
pub mod sanctions;
pub mod threshold;
pub mod trend;
pub mod validation;

pub use category::{CategoryBands, Dimension, RiskCategory};
pub use config::*;
pub use engine::{AggregateResult, RiskAggregator};
pub use error::ScoringError;
pub use federal_contract::FederalContractScorer;
pub use financial::{FinancialMetric, FinancialScorer};
pub use foreign_labor::{CountryRiskTier, ForeignLaborScorer};
pub use past_performance::{CancellationCategory, PastPerformanceScorer};
pub use result::{round2, ScoreComponent, ScoreDetail, ScoreResult};
pub use sanctions::SanctionsScorer;
pub use threshold::{score_with_thresholds, ThresholdBand, ThresholdTable};
pub use trend::{TrendAnalyzer, TrendClassification, TrendResult};
pub use validation::validate_scoring;
