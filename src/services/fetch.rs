//! 单个数据槽的获取状态
//!
//! 状态流转：`idle → loading → ready | empty | failed`。
//! 每次发起请求都会分配一个单调递增的序号，完成时只有序号仍是最新的结果
//! 才会被写入，旧请求的迟到结果直接丢弃（不取消在途请求）。

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    /// 正常的空结果，携带展示文案
    Empty(String),
    /// 失败，携带展示文案
    Failed(String),
}

impl<T> FetchState<T> {
    /// 将请求结果映射为终态
    ///
    /// 空结果类错误保留自身文案，其余错误统一使用 `failure` 文案
    pub fn from_result(result: Result<T>, failure: &str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) if e.is_empty_state() => Self::Empty(e.message().to_string()),
            Err(_) => Self::Failed(failure.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Empty(_) | Self::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// 空态或失败时的展示文案
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Empty(msg) | Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchState<U> {
        match self {
            Self::Idle => FetchState::Idle,
            Self::Loading => FetchState::Loading,
            Self::Ready(value) => FetchState::Ready(f(value)),
            Self::Empty(msg) => FetchState::Empty(msg),
            Self::Failed(msg) => FetchState::Failed(msg),
        }
    }
}

pub struct FetchSlot<T> {
    name: &'static str,
    seq: AtomicU64,
    state: RwLock<FetchState<T>>,
}

impl<T: Clone> FetchSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            seq: AtomicU64::new(0),
            state: RwLock::new(FetchState::Idle),
        }
    }

    /// 发起新请求：分配序号并进入 loading
    pub fn begin(&self) -> u64 {
        let mut state = self.state.write();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        *state = FetchState::Loading;
        seq
    }

    /// 写入请求结果；序号已过期时丢弃并返回 false
    pub fn finish(&self, seq: u64, outcome: FetchState<T>) -> bool {
        let mut state = self.state.write();
        let latest = self.seq.load(Ordering::SeqCst);
        if seq != latest {
            debug!(
                "Discarding stale {} result (seq {} < latest {})",
                self.name, seq, latest
            );
            return false;
        }
        *state = outcome;
        true
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.state.read().clone()
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    /// 回到 idle，并使所有在途请求失效
    pub fn reset(&self) {
        let mut state = self.state.write();
        self.seq.fetch_add(1, Ordering::SeqCst);
        *state = FetchState::Idle;
    }
}
