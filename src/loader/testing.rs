//! In-memory fetcher for loader and poller tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;
use crate::loader::errors::FetchError;
use crate::loader::{FetchRequest, Fetcher};

#[derive(Clone)]
pub(crate) enum Reply {
    Json(Value),
    Status(u16),
    Garbage,
    Hang,
    Slow(Duration, Value),
    /// the fetch task dies
    Panic,
    /// n-th request for the path gets the n-th reply; the last one repeats
    Sequence(Vec<Reply>),
}

pub(crate) struct MockFetcher {
    replies: HashMap<String, Reply>,
    fallback: Reply,
    seen: Mutex<Vec<(String, u64)>>,
}

impl MockFetcher {
    /// Every document answers `fallback` unless overridden with `reply`
    pub(crate) fn new(fallback: Reply) -> Self {
        Self {
            replies: HashMap::new(),
            fallback,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Override the answer for a relative path such as `cron.json`
    pub(crate) fn reply(mut self, path: &str, reply: Reply) -> Self {
        self.replies.insert(path.to_string(), reply);
        self
    }

    /// `(relative path, cache buster)` of every request so far
    pub(crate) fn seen(&self) -> Vec<(String, u64)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let path = request.target.relative_path();
        let attempt = {
            let mut seen = self.seen.lock().unwrap();
            let attempt = seen.iter().filter(|(p, _)| *p == path).count();
            seen.push((path.clone(), request.cache_buster));
            attempt
        };

        let mut reply = self.replies.get(&path).unwrap_or(&self.fallback).clone();
        if let Reply::Sequence(replies) = reply {
            reply = replies[attempt.min(replies.len() - 1)].clone();
        }
        match reply {
            Reply::Json(value) => Ok(value),
            Reply::Status(code) => Err(FetchError::Status(code)),
            Reply::Garbage => Ok(serde_json::from_str("{garbage")?),
            Reply::Hang => std::future::pending().await,
            Reply::Slow(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Reply::Panic => panic!("fetch of {} blew up", path),
            Reply::Sequence(_) => unreachable!("nested reply sequence"),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
