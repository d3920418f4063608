//! HTTP API の DTO 定義

use serde::{Deserialize, Serialize};

/// `GET /search` のレスポンス要素（類似度ランキング済みの候補）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultDto {
    pub id: String,
    pub user_id: String,
    pub text: String,
    /// [0, 1] の類似度スコア
    pub score: f64,
}
