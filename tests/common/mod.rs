#![allow(dead_code)]

use lotto_lib::api::{self, RawHtml, Transport};
use lotto_lib::error::NetworkError;
use lotto_lib::orchestrator::CancelFlag;
use lotto_lib::retry::Sleeper;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://lotto.test/gameResult.do";
pub const ROUND_1150: &str = include_str!("../fixtures/round_1150.html");

/// Serves canned pages; anything else answers 404.
#[derive(Default)]
pub struct StubTransport {
    pages: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
    cancel_on: Option<(String, CancelFlag)>,
}

impl StubTransport {
    pub fn with_rounds(rounds: &[u32]) -> Self {
        let mut stub = Self::default();
        for &round in rounds {
            stub = stub.with_page(api::round_url(BASE_URL, round), ROUND_1150);
        }
        stub
    }

    pub fn with_page(mut self, url: impl Into<String>, body: &str) -> Self {
        self.pages.insert(url.into(), body.to_string());
        self
    }

    /// Raises `flag` as soon as `url` is requested.
    pub fn cancel_on(mut self, url: impl Into<String>, flag: CancelFlag) -> Self {
        self.cancel_on = Some((url.into(), flag));
        self
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl Transport for StubTransport {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawHtml, NetworkError>> + Send {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some((trigger, flag)) = &self.cancel_on {
            if trigger == url {
                flag.cancel();
            }
        }
        let result = match self.pages.get(url) {
            Some(body) => Ok(RawHtml {
                body: body.clone(),
                final_url: url.to_string(),
            }),
            None => Err(NetworkError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            }),
        };
        std::future::ready(result)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.slept.lock().unwrap().push(duration);
        std::future::ready(())
    }
}
