//! 交渉タイマーの管理
//!
//! チャットリクエストごとの期限タイマー（ターゲット側の受諾期限と
//! リクエスト側の応答タイムアウト）を RequestId をキーに保持する。
//! リクエストが終端状態に達したら必ず `cancel` を呼び、解決済み
//! リクエストに対して stale なタイマーが発火しないようにする。
//! `cancel` は冪等であり、切断経路から重複して呼ばれても安全。

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::RequestId;

/// リクエスト単位の中断可能タイマー群
pub struct NegotiationTimers {
    timers: Mutex<HashMap<RequestId, Vec<JoinHandle<()>>>>,
}

impl NegotiationTimers {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// リクエストのタイマーハンドル群を登録する。
    ///
    /// 同じ RequestId への再登録は想定しない（RequestId は生成ごとに
    /// 一意）。万一重複した場合は古いハンドルを中断して置き換える。
    pub async fn register(&self, id: RequestId, handles: Vec<JoinHandle<()>>) {
        let mut timers = self.timers.lock().await;
        if let Some(old) = timers.insert(id, handles) {
            for handle in old {
                handle.abort();
            }
        }
    }

    /// リクエストのタイマーを全て中断して破棄する（冪等）
    pub async fn cancel(&self, id: &RequestId) {
        let mut timers = self.timers.lock().await;
        if let Some(handles) = timers.remove(id) {
            for handle in handles {
                handle.abort();
            }
            tracing::debug!("Cancelled timers for request '{}'", id.as_str());
        }
    }

    /// 登録中のリクエスト数（テスト用）
    pub async fn active_count(&self) -> usize {
        let timers = self.timers.lock().await;
        timers.len()
    }
}

impl Default for NegotiationTimers {
    fn default() -> Self {
        Self::new()
    }
}
