//! Browser feed refresher
//!
//! Same cycle as the native refresher, driven by `spawn_local` with a
//! `setTimeout` based sleep between cycles.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{error, info};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::config::VisConfig;
use crate::core::SharedFeed;
use crate::fetch::fetch_with_fallback;

pub struct FeedRefresher {
    pub feed: SharedFeed,
    shutdown: Rc<Cell<bool>>,
}

impl FeedRefresher {
    /// Start refreshing; `on_update` runs on the main thread after every replacement.
    pub fn spawn(config: VisConfig, on_update: impl Fn() + 'static) -> Self {
        let feed = SharedFeed::new();
        let shutdown = Rc::new(Cell::new(false));

        let feed_clone = feed.clone();
        let shutdown_clone = shutdown.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let client = reqwest::Client::new();
            info!(url = %config.primary_url, "Feed refresher started");

            while !shutdown_clone.get() {
                let update = fetch_with_fallback(&client, &config).await;
                feed_clone.replace(update);
                on_update();
                if let Err(e) = sleep(config.refresh_interval).await {
                    error!(?e, "Refresh timer failed");
                    break;
                }
            }

            info!("Feed refresher stopped");
        });

        Self { feed, shutdown }
    }
}

impl Drop for FeedRefresher {
    fn drop(&mut self) {
        self.shutdown.set(true);
    }
}

async fn sleep(duration: Duration) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let ms = duration.as_millis().min(i32::MAX as u128) as i32;

    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
    });
    scheduled?;
    JsFuture::from(promise).await.map(|_| ())
}
