//! Browser bindings
//!
//! `HttpBackend` talks to the key-value service with `fetch`; `WebGame`
//! is the handle the JS host creates, drives from `requestAnimationFrame`
//! and renders from.

use std::rc::Rc;

use futures::lock::Mutex;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::keyvalue::{DEFAULT_BASE_URL, parse_value, value_url};
use crate::consts::*;
use crate::game_loop::GameLoop;
use crate::leaderboard::{Leaderboard, SaveOutcome};
use crate::persistence::{BackendError, ChunkedStore, DEFAULT_VALUE_LIMIT, KvBackend};
use crate::settings::Settings;
use crate::tuning::Difficulty;

fn js_error(e: JsValue) -> BackendError {
    BackendError::Transport(format!("{:?}", e))
}

/// Key-value service client over `fetch`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    collection: String,
}

impl HttpBackend {
    pub fn new(collection: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, collection)
    }

    pub fn with_base_url(base_url: &str, collection: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            collection: collection.to_string(),
        }
    }

    async fn request(&self, key: &str, method: &str, url: &str) -> Result<String, BackendError> {
        let window = web_sys::window().ok_or_else(|| BackendError::Transport("no window".into()))?;

        let init = RequestInit::new();
        init.set_method(method);
        init.set_mode(RequestMode::Cors);
        let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: Response = response.dyn_into().map_err(js_error)?;
        if !response.ok() {
            return Err(BackendError::Status {
                key: key.to_string(),
                status: response.status(),
            });
        }

        let body = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(body.as_string().unwrap_or_default())
    }
}

impl KvBackend for HttpBackend {
    fn value_limit(&self) -> usize {
        DEFAULT_VALUE_LIMIT
    }

    async fn raw_get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let url = value_url(&self.base_url, "GetValue", &self.collection, key, None);
        let body = self.request(key, "GET", &url).await?;
        Ok(parse_value(&body))
    }

    async fn raw_set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let len = value.chars().count();
        if len > DEFAULT_VALUE_LIMIT {
            return Err(BackendError::ValueTooLong {
                key: key.to_string(),
                len,
                limit: DEFAULT_VALUE_LIMIT,
            });
        }
        let url = value_url(&self.base_url, "UpdateValue", &self.collection, key, Some(value));
        self.request(key, "POST", &url).await?;
        Ok(())
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) is harmless
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Jungle Jump starting...");
}

/// Game handle for the JS host
#[wasm_bindgen]
pub struct WebGame {
    game: GameLoop,
    settings: Settings,
    leaderboard: Rc<Mutex<Leaderboard<HttpBackend>>>,
}

#[wasm_bindgen]
impl WebGame {
    /// `mode` is `"easy"` or `"hard"`; anything else keeps the saved mode
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, now: f64) -> WebGame {
        let mut settings = Settings::load();
        if let Some(difficulty) = Difficulty::from_str(mode) {
            settings.difficulty = difficulty;
            settings.save();
        }

        let backend = HttpBackend::new(settings.collection());
        let leaderboard = Leaderboard::new(ChunkedStore::new(backend));

        WebGame {
            game: GameLoop::new(settings.tuning(), rand::random(), now),
            settings,
            leaderboard: Rc::new(Mutex::new(leaderboard)),
        }
    }

    /// Advance to `now`; returns the play-time note on the frame the run ends
    pub fn frame(&mut self, now: f64) -> Option<String> {
        self.game.frame(now).summary.map(|s| s.note())
    }

    /// Pointer position in field coordinates
    pub fn set_pointer_x(&mut self, x: f32) {
        self.game.set_target_x(x.clamp(0.0, FIELD_WIDTH));
    }

    pub fn restart(&mut self, now: f64) {
        self.game.restart(rand::random(), now);
    }

    pub fn score(&self) -> f64 {
        self.game.state().score as f64
    }

    pub fn is_over(&self) -> bool {
        self.game.state().is_over()
    }

    pub fn player_x(&self) -> f32 {
        self.game.state().player.pos.x
    }

    /// World y of the top of the screen; decreases as the camera rises
    pub fn camera_offset(&self) -> f32 {
        self.game.state().camera_offset
    }

    /// Player y in screen space
    pub fn player_y(&self) -> f32 {
        let state = self.game.state();
        state.screen_y(state.player.pos.y)
    }

    /// Flattened `[x, screen_y, width, height, is_bedrock]` per platform
    pub fn platforms(&self) -> Vec<f32> {
        let state = self.game.state();
        state
            .platforms
            .iter()
            .flat_map(|p| {
                [
                    p.pos.x,
                    state.screen_y(p.pos.y),
                    p.width,
                    p.height,
                    if p.is_bedrock() { 1.0 } else { 0.0 },
                ]
            })
            .collect()
    }

    pub fn player_name(&self) -> Option<String> {
        self.settings.player_name.clone()
    }

    /// Store the name for later runs; false if it fails validation
    pub fn remember_name(&mut self, name: &str) -> bool {
        let kept = self.settings.remember_name(name);
        if kept {
            self.settings.save();
        }
        kept
    }

    /// Resolves to the entries as a JSON array
    pub fn fetch_leaderboard(&self) -> js_sys::Promise {
        let leaderboard = self.leaderboard.clone();
        future_to_promise(async move {
            let mut leaderboard = leaderboard.lock().await;
            let table = leaderboard
                .fetch()
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let json = serde_json::to_string(table.entries())
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Resolves to the achieved rank, or `null` if the score did not place
    pub fn save_score(&self, name: String, score: f64, note: String) -> js_sys::Promise {
        let leaderboard = self.leaderboard.clone();
        future_to_promise(async move {
            let mut leaderboard = leaderboard.lock().await;
            match leaderboard.save_score(&name, score.max(0.0) as u64, &note).await {
                Ok(SaveOutcome::Saved { rank }) => Ok(JsValue::from_f64(rank as f64)),
                Ok(SaveOutcome::NotHighEnough) => Ok(JsValue::NULL),
                Err(e) => {
                    log::warn!("Saving score failed: {}", e);
                    Err(JsValue::from_str(&e.to_string()))
                }
            }
        })
    }
}
