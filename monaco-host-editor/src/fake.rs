//! Scripted stand-in for the webview, used by the view tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use monaco_host_core::transport::{self, EncodedPayload, Encoding};

use crate::runtime::ScriptRuntime;
use crate::scripts;

pub struct FakeRuntime {
    /// Probe number (1-based) from which the page reports ready.
    ready_at: Option<u32>,
    probes: Cell<u32>,
    failing: Cell<bool>,
    rejected: RefCell<HashSet<Encoding>>,
    canned: RefCell<Vec<(String, String)>>,
    latency: Cell<Duration>,
    in_flight: Cell<u32>,
    max_in_flight: Cell<u32>,
    pub loaded: RefCell<Vec<String>>,
    pub scripts: RefCell<Vec<String>>,
    /// Property writes the page accepted, in order (`"theme:vs"`, ...).
    pub applied: RefCell<Vec<String>>,
    pub texts: RefCell<HashMap<String, String>>,
    pub outbox: RefCell<Vec<String>>,
}

impl FakeRuntime {
    pub fn ready_after(probes: u32) -> Self {
        FakeRuntime {
            ready_at: Some(probes),
            probes: Cell::new(0),
            failing: Cell::new(false),
            rejected: RefCell::new(HashSet::new()),
            canned: RefCell::new(Vec::new()),
            latency: Cell::new(Duration::ZERO),
            in_flight: Cell::new(0),
            max_in_flight: Cell::new(0),
            loaded: RefCell::new(Vec::new()),
            scripts: RefCell::new(Vec::new()),
            applied: RefCell::new(Vec::new()),
            texts: RefCell::new(HashMap::new()),
            outbox: RefCell::new(Vec::new()),
        }
    }

    pub fn never_ready() -> Self {
        FakeRuntime {
            ready_at: None,
            ..FakeRuntime::ready_after(0)
        }
    }

    pub fn probes(&self) -> u32 {
        self.probes.get()
    }

    pub fn reject(&self, encoding: Encoding) {
        self.rejected.borrow_mut().insert(encoding);
    }

    /// Make every evaluation fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Answer scripts containing `needle` with `result`.
    pub fn respond(&self, needle: &str, result: &str) {
        self.canned
            .borrow_mut()
            .push((needle.to_string(), result.to_string()));
    }

    /// Virtual time every evaluation takes before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.latency.set(latency);
    }

    /// Most evaluations that were ever running at once.
    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.get()
    }

    pub fn text(&self, target: &str) -> Option<String> {
        self.texts.borrow().get(target).cloned()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.scripts
            .borrow()
            .iter()
            .filter(|s| s.contains(needle))
            .count()
    }

    fn handle_set_text(&self, script: &str) -> String {
        let Some(start) = script.find("h.setText(") else {
            return "error: malformed".to_string();
        };
        let Some(end) = script.rfind("); })()") else {
            return "error: malformed".to_string();
        };
        let args = &script[start + "h.setText(".len()..end];
        let mut parts = args.splitn(3, ", ");
        let (Some(target), Some(encoding), Some(body)) = (parts.next(), parts.next(), parts.next())
        else {
            return "error: malformed".to_string();
        };
        let target = target.trim_matches('"').to_string();
        let encoding = match encoding.trim_matches('"') {
            "raw-escaped" => Encoding::RawEscaped,
            _ => Encoding::Base64,
        };
        if self.rejected.borrow().contains(&encoding) {
            return "error: rejected".to_string();
        }
        let payload = EncodedPayload {
            encoding,
            body: body[1..body.len() - 1].to_string(),
        };
        match transport::decode(&payload) {
            Ok(text) => {
                self.applied
                    .borrow_mut()
                    .push(format!("{}:{}", target, text));
                self.texts.borrow_mut().insert(target, text);
                "success".to_string()
            }
            Err(e) => format!("error: {}", e),
        }
    }

    fn handle_style(&self, script: &str, call: &str, what: &str) -> String {
        let start = script.find(call).map(|i| i + call.len());
        let end = script.rfind("); })()");
        match (start, end) {
            (Some(start), Some(end)) => {
                let value: String = serde_json::from_str(&script[start..end]).unwrap();
                self.applied.borrow_mut().push(format!("{}:{}", what, value));
                "success".to_string()
            }
            _ => "error: malformed".to_string(),
        }
    }
}

#[async_trait(?Send)]
impl ScriptRuntime for FakeRuntime {
    fn load_html(&self, html: &str, _base_url: Option<&str>) {
        self.loaded.borrow_mut().push(html.to_string());
    }

    async fn evaluate(&self, script: &str) -> Result<String, String> {
        self.scripts.borrow_mut().push(script.to_string());
        let running = self.in_flight.get() + 1;
        self.in_flight.set(running);
        self.max_in_flight.set(self.max_in_flight.get().max(running));
        let latency = self.latency.get();
        if latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.set(self.in_flight.get() - 1);
        self.answer(script)
    }
}

impl FakeRuntime {
    fn answer(&self, script: &str) -> Result<String, String> {
        if script == scripts::PROBE {
            let n = self.probes.get() + 1;
            self.probes.set(n);
            if self.failing.get() {
                return Err("page crashed".to_string());
            }
            let ready = self.ready_at.is_some_and(|at| n >= at);
            return Ok(ready.to_string());
        }
        if self.failing.get() {
            return Err("page crashed".to_string());
        }
        if let Some((_, result)) = self
            .canned
            .borrow()
            .iter()
            .find(|(needle, _)| script.contains(needle.as_str()))
        {
            return Ok(result.clone());
        }
        if script.contains("h.setText(") {
            return Ok(self.handle_set_text(script));
        }
        if script.contains("h.setLanguage(") {
            return Ok(self.handle_style(script, "h.setLanguage(", "language"));
        }
        if script.contains("h.setTheme(") {
            return Ok(self.handle_style(script, "h.setTheme(", "theme"));
        }
        for target in ["value", "original", "modified"] {
            if script.contains(&format!("h.getText(\"{}\")", target)) {
                let text = self.text(target).unwrap_or_default();
                return Ok(serde_json::to_string(&text).unwrap());
            }
        }
        if script == scripts::DRAIN_EVENTS {
            let out: Vec<String> = self.outbox.borrow_mut().drain(..).collect();
            return Ok(serde_json::to_string(&out).unwrap());
        }
        if script == scripts::DISPOSE {
            return Ok("success".to_string());
        }
        Ok("true".to_string())
    }
}
