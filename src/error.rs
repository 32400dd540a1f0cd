// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Error Types

use crate::types::CoinId;

/// Errors surfaced by the market engine.
///
/// Most degenerate market states are policy branches that log and continue;
/// these variants cover the cases a caller can act on.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("unknown coin: {0}")]
    UnknownCoin(CoinId),

    #[error("invalid market config: {0}")]
    InvalidConfig(String),

    #[error("unsupported snapshot version {found} (newest supported: {supported})")]
    UnsupportedSnapshot { found: u32, supported: u32 },

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
