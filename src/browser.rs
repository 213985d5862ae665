//! Thin wrappers over the browser APIs the widgets touch: event listeners,
//! the page location, `fetch`, and the console logger.

use asset_filters::{FilterOption, LookupConfig, LookupError, QueryError, QueryTarget};
use js_sys::Function;
use log::{Level, LevelFilter, Log, Metadata, Record};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, EventTarget, Response};

use crate::config::SEARCH_MODE_SELECTOR;

/// An event listener that is removed when dropped.
pub struct EventListener {
    target: EventTarget,
    event_type: &'static str,
    callback: Option<Closure<dyn FnMut(Event)>>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, event_type: &'static str, mut handler: F) -> Self
    where
        F: FnMut(&Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(move |e: Event| handler(&e));
        if let Err(err) = target
            .add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref())
        {
            log::warn!("cannot listen for {event_type}: {err:?}");
        }
        Self {
            target: target.clone(),
            event_type,
            callback: Some(callback),
        }
    }

    /// Keep the listener attached for the lifetime of the page.
    pub fn forget(mut self) {
        if let Some(callback) = self.callback.take() {
            callback.forget();
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        if let Some(callback) = &self.callback {
            let function: &Function = callback.as_ref().unchecked_ref();
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event_type, function);
        }
    }
}

/// The page's own URL. Writes replace the current history entry, so the page
/// never navigates.
pub struct BrowserLocation;

impl QueryTarget for BrowserLocation {
    fn current(&self) -> Result<Url, QueryError> {
        let href = gloo_utils::window()
            .location()
            .href()
            .map_err(|e| QueryError::Location(format!("{e:?}")))?;
        Ok(Url::parse(&href)?)
    }

    fn replace(&mut self, url: &Url) -> Result<(), QueryError> {
        gloo_utils::history()
            .replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
            .map_err(|e| QueryError::Location(format!("{e:?}")))
    }
}

pub fn is_search_mode() -> bool {
    matches!(
        gloo_utils::document().query_selector(SEARCH_MODE_SELECTOR),
        Ok(Some(_))
    )
}

/// Issue a lookup for `fragment` and decode the matching options.
pub async fn fetch_options(
    lookup: &LookupConfig,
    fragment: &str,
) -> Result<Vec<FilterOption>, LookupError> {
    let page = BrowserLocation
        .current()
        .map_err(|e| LookupError::Network(e.to_string()))?;
    let url = lookup.request_url(&page, fragment)?;

    let window = gloo_utils::window();
    let response: Response = JsFuture::from(window.fetch_with_str(url.as_str()))
        .await
        .map_err(|e| LookupError::Network(format!("{e:?}")))?
        .dyn_into()
        .map_err(|e| LookupError::Network(format!("not a Response: {e:?}")))?;

    if !response.ok() {
        return Err(LookupError::Status(response.status()));
    }

    let text = response
        .text()
        .map_err(|e| LookupError::Decode(format!("{e:?}")))?;
    let body = JsFuture::from(text)
        .await
        .map_err(|e| LookupError::Decode(format!("{e:?}")))?
        .as_string()
        .unwrap_or_default();
    lookup.decode(&body)
}

/// Forwards `log` records to the browser console.
struct ConsoleLogger {
    level: LevelFilter,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

pub fn init_logging(level: LevelFilter) {
    let logger: &'static ConsoleLogger = Box::leak(Box::new(ConsoleLogger { level }));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}
