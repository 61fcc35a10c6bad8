//! [`Driver`] implementation over a local Chrome/Chromium instance.

use crate::config::toml_config::BrowserConfig;
use crate::domain::ports::Driver;
use crate::utils::error::{DriverError, DriverResult};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Chrome stops an idle browser after this long; waits on slow pages count as idle.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

pub struct ChromeDriver {
    /// The Chrome process lives as long as this handle; `quit` drops it.
    browser: Mutex<Option<Browser>>,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(config: &BrowserConfig) -> DriverResult<Self> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| DriverError::Session(e.to_string()))?;

        let browser = Browser::new(options).map_err(session_error)?;
        let tab = browser.new_tab().map_err(session_error)?;
        tab.set_default_timeout(Duration::from_secs(config.wait_timeout_seconds));

        tracing::info!(
            "Launched Chrome ({}, {}x{})",
            if config.headless { "headless" } else { "headed" },
            config.window_width,
            config.window_height
        );
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            tab,
        })
    }
}

fn session_error(error: impl Display) -> DriverError {
    DriverError::Session(format!("{:#}", error))
}

/// Maps a DevTools failure onto the driver taxonomy. The protocol only
/// reports these as messages.
fn classify(error: impl Display, selector: &str, timeout: Option<Duration>) -> DriverError {
    let message = format!("{:#}", error);
    if message.contains("never came") {
        DriverError::Timeout {
            selector: selector.to_string(),
            timeout: timeout.unwrap_or_default(),
        }
    } else if message.contains("No element found")
        || message.contains("Couldn't find element")
    {
        DriverError::NotFound {
            selector: selector.to_string(),
        }
    } else if message.contains("Could not find node")
        || message.contains("No node with given id")
        || message.contains("Node is detached")
        || message.contains("Cannot find context")
    {
        DriverError::Stale
    } else {
        DriverError::Session(message)
    }
}

/// An empty match is not an error for `find_all`.
fn none_if_missing<'a>(
    found: DriverResult<Vec<Element<'a>>>,
) -> DriverResult<Vec<Element<'a>>> {
    match found {
        Err(DriverError::NotFound { .. }) => Ok(Vec::new()),
        other => other,
    }
}

impl Driver for ChromeDriver {
    type Node<'a> = Element<'a>;

    fn navigate(&self, url: &str) -> DriverResult<()> {
        tracing::debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| classify(e, url, None))?;
        Ok(())
    }

    fn find_one(&self, selector: &str) -> DriverResult<Element<'_>> {
        self.tab
            .find_element(selector)
            .map_err(|e| classify(e, selector, None))
    }

    fn find_all(&self, selector: &str) -> DriverResult<Vec<Element<'_>>> {
        none_if_missing(
            self.tab
                .find_elements(selector)
                .map_err(|e| classify(e, selector, None)),
        )
    }

    fn find_one_in<'a>(&'a self, scope: &Element<'a>, selector: &str) -> DriverResult<Element<'a>> {
        scope
            .find_element(selector)
            .map_err(|e| classify(e, selector, None))
    }

    fn find_all_in<'a>(
        &'a self,
        scope: &Element<'a>,
        selector: &str,
    ) -> DriverResult<Vec<Element<'a>>> {
        none_if_missing(
            scope
                .find_elements(selector)
                .map_err(|e| classify(e, selector, None)),
        )
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> DriverResult<Element<'_>> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| classify(e, selector, Some(timeout)))
    }

    fn click<'a>(&'a self, node: &Element<'a>) -> DriverResult<()> {
        node.click().map_err(|e| classify(e, "click target", None))?;
        Ok(())
    }

    fn text<'a>(&'a self, node: &Element<'a>) -> DriverResult<String> {
        let text = node
            .get_inner_text()
            .map_err(|e| classify(e, "text node", None))?;
        Ok(text.trim().to_string())
    }

    fn attribute<'a>(&'a self, node: &Element<'a>, name: &str) -> DriverResult<Option<String>> {
        node.get_attribute_value(name)
            .map_err(|e| classify(e, name, None))
    }

    fn run_script<'a>(
        &'a self,
        target: &Element<'a>,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> DriverResult<()> {
        target
            .call_js_fn(function, args, false)
            .map_err(|e| DriverError::Script(format!("{:#}", e)))?;
        Ok(())
    }

    fn type_text<'a>(&'a self, node: &Element<'a>, text: &str) -> DriverResult<()> {
        node.type_into(text)
            .map_err(|e| classify(e, "input", None))?;
        Ok(())
    }

    fn quit(&self) -> DriverResult<()> {
        let closed = self.tab.close(true).map(|_| ()).map_err(session_error);
        // Dropping the handle kills the Chrome process, even if the tab did not close.
        let browser = self
            .browser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if browser.is_some() {
            tracing::debug!("Shutting down Chrome");
        }
        drop(browser);
        closed
    }
}
