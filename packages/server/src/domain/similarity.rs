//! 類似度ランキング
//!
//! クエリ文字列と候補集合から類似度スコア付きの全順序を作る純粋ロジック。
//! 副作用なし・決定的であり、同じ入力には必ず同じ順序を返す。候補の追加・
//! 取り下げのたびに差分ではなく全集合に対して再実行すること（グローバルな
//! 順序が変わり得るため）。

use std::cmp::Ordering;

use serde::Serialize;

use super::entity::Thought;
use super::value_object::{ParticipantId, ThoughtId, ThoughtText};

/// スコア付きの候補
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub thought_id: ThoughtId,
    pub participant_id: ParticipantId,
    pub text: ThoughtText,
    /// [0, 1] の類似度スコア
    pub score: f64,
}

/// 2 つのテキストの類似度スコアを計算する。
///
/// Sørensen–Dice のバイグラム類似度。大文字小文字を畳み、前後の空白を
/// 除去してから比較する。同一テキストは 1.0。
pub fn similarity_score(query: &str, candidate: &str) -> f64 {
    strsim::sorensen_dice(&normalize(query), &normalize(candidate))
}

/// 候補集合をクエリとの類似度でランキングする。
///
/// スコア降順。同スコアは候補集合内の並び（到着順）を保つ。
pub fn rank(query: &str, candidates: &[Thought]) -> Vec<RankedCandidate> {
    let normalized_query = normalize(query);
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|thought| RankedCandidate {
            thought_id: thought.id.clone(),
            participant_id: thought.participant_id.clone(),
            text: thought.text.clone(),
            score: strsim::sorensen_dice(&normalized_query, &normalize(thought.text.as_str())),
        })
        .collect();

    // sort_by は安定ソートなので同スコアの到着順が保たれる
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    ranked
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{ThoughtIdFactory, Timestamp};

    fn thought(who: &str, text: &str) -> Thought {
        Thought::new(
            ThoughtIdFactory::generate().unwrap(),
            ParticipantId::new(who.to_string()).unwrap(),
            ThoughtText::new(text.to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_identical_text_scores_one_and_ranks_first() {
        // テスト項目: 同一テキストがスコア 1.0 で先頭に来る
        // given (前提条件):
        let candidates = vec![
            thought("bob", "I hate sunny days"),
            thought("charlie", "I love rainy days"),
        ];

        // when (操作):
        let ranked = rank("I love rainy days", &candidates);

        // then (期待する結果):
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].participant_id.as_str(), "charlie");
        assert!((ranked[0].score - 1.0).abs() < f64::EPSILON);
        assert!(ranked[1].score < ranked[0].score);
    }

    #[test]
    fn test_scores_are_within_unit_interval() {
        // テスト項目: 全スコアが [0, 1] に収まる
        // given (前提条件):
        let candidates = vec![
            thought("a", "completely unrelated topic"),
            thought("b", "I love rainy days"),
            thought("c", "rainy days are lovely"),
        ];

        // when (操作):
        let ranked = rank("I love rainy days", &candidates);

        // then (期待する結果):
        for candidate in &ranked {
            assert!(candidate.score >= 0.0);
            assert!(candidate.score <= 1.0);
        }
    }

    #[test]
    fn test_ranking_is_descending() {
        // テスト項目: スコアが降順に並ぶ
        // given (前提条件):
        let candidates = vec![
            thought("a", "bananas are yellow"),
            thought("b", "I love rainy days"),
            thought("c", "I love sunny days"),
        ];

        // when (操作):
        let ranked = rank("I love rainy days", &candidates);

        // then (期待する結果):
        for window in ranked.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn test_ranking_is_idempotent() {
        // テスト項目: ランキング済み集合を同じクエリで再ランキングしても
        //             同じ順序になる
        // given (前提条件):
        let candidates = vec![
            thought("a", "rainy days"),
            thought("b", "I love rainy days"),
            thought("c", "sunny days"),
            thought("d", "thunderstorms at night"),
        ];
        let first = rank("I love rainy days", &candidates);

        // when (操作): 1 回目の順序で並べた集合を再ランキング
        let reordered: Vec<Thought> = first
            .iter()
            .map(|r| {
                Thought::new(
                    r.thought_id.clone(),
                    r.participant_id.clone(),
                    r.text.clone(),
                    Timestamp::new(1000),
                )
            })
            .collect();
        let second = rank("I love rainy days", &reordered);

        // then (期待する結果):
        let first_ids: Vec<&str> = first.iter().map(|r| r.participant_id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_ties_preserve_insertion_order() {
        // テスト項目: 同スコアの候補が到着順を保つ（安定ソート）
        // given (前提条件): クエリと無関係な同一テキストを 3 件
        let candidates = vec![
            thought("first", "zzz qqq xxx"),
            thought("second", "zzz qqq xxx"),
            thought("third", "zzz qqq xxx"),
        ];

        // when (操作):
        let ranked = rank("I love rainy days", &candidates);

        // then (期待する結果):
        let ids: Vec<&str> = ranked.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_similarity_is_case_insensitive() {
        // テスト項目: 大文字小文字の違いがスコアに影響しない
        // given (前提条件):

        // when (操作):
        let score = similarity_score("I Love Rainy Days", "i love rainy days");

        // then (期待する結果):
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_candidate_set_yields_empty_ranking() {
        // テスト項目: 空の候補集合は空のランキングになる
        // given (前提条件):
        let candidates: Vec<Thought> = Vec::new();

        // when (操作):
        let ranked = rank("I love rainy days", &candidates);

        // then (期待する結果):
        assert!(ranked.is_empty());
    }
}
