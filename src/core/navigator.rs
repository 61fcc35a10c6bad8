//! Traversal of the catalog's list/detail UI.
//!
//! List handles are invalidated by most interactions, so nothing here keeps a
//! handle across calls: every selection re-reads the list and indexes into the
//! fresh snapshot.

use crate::domain::ports::Driver;
use crate::utils::error::{DriverError, Result};
use std::time::Duration;

/// Positions the selected item at the top of its scrollable list.
const SCROLL_INTO_LIST: &str = r#"function(listSelector) {
    const parent = document.querySelector(listSelector);
    if (parent) {
        parent.scrollTop = this.offsetTop - parent.offsetTop;
    }
}"#;

#[derive(Debug, Clone, Copy)]
pub struct TraversalSettings {
    pub wait_timeout: Duration,
    /// Attempts per item, including the first one.
    pub attempts: usize,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            attempts: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListSelectors {
    /// Scrollable container of the items.
    pub list: String,
    pub items: String,
    /// Label with the catalog's own item count.
    pub total_size: String,
}

/// Runs `op` until it succeeds, fails with a non-transient error, or
/// `attempts` are used up.
pub fn retry_transient<T>(
    attempts: usize,
    what: &str,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if e.is_transient() && attempt < attempts => {
                tracing::debug!(
                    "Transient failure on {} (attempt {}/{}): {}",
                    what,
                    attempt,
                    attempts,
                    e
                );
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

pub struct Navigator<'d, D: Driver> {
    driver: &'d D,
    selectors: ListSelectors,
    settings: TraversalSettings,
}

impl<'d, D: Driver> Navigator<'d, D> {
    pub fn new(driver: &'d D, selectors: ListSelectors, settings: TraversalSettings) -> Self {
        Self {
            driver,
            selectors,
            settings,
        }
    }

    pub fn settings(&self) -> TraversalSettings {
        self.settings
    }

    /// Number of items in a fresh snapshot of the list.
    pub fn count(&self) -> Result<usize> {
        Ok(self.driver.find_all(&self.selectors.items)?.len())
    }

    pub fn log_totals(&self, listed: usize) {
        let label = self
            .driver
            .find_one(&self.selectors.total_size)
            .and_then(|node| self.driver.text(&node));
        match label {
            Ok(label) => tracing::info!("{}", label),
            Err(e) => tracing::debug!("Catalog total label not available: {}", e),
        }
        tracing::info!("Items in list: {}", listed);
    }

    /// Clicks item `index` of a freshly read list and scrolls it into view.
    ///
    /// A stale or vanished item on click is only logged: if the click had no
    /// effect, the caller's wait on the detail panel is what fails.
    pub fn select_item(&self, index: usize) -> Result<()> {
        let items = self.driver.find_all(&self.selectors.items)?;
        let item = items.get(index).ok_or_else(|| DriverError::NotFound {
            selector: format!("{} (item {} of {})", self.selectors.items, index + 1, items.len()),
        })?;

        match self.driver.click(item) {
            Ok(()) => {}
            Err(e) if e.is_transient() => {
                tracing::error!("Error clicking item {}: {}", index + 1, e);
            }
            Err(e) => return Err(e.into()),
        }

        let scrolled = self.driver.run_script(
            item,
            SCROLL_INTO_LIST,
            vec![serde_json::Value::String(self.selectors.list.clone())],
        );
        if let Err(e) = scrolled {
            tracing::debug!("Could not scroll item {} into view: {}", index + 1, e);
        }
        Ok(())
    }

    /// Selects item `index` and runs `extract` against its detail panel,
    /// starting over from a re-read list on transient failures.
    pub fn visit<T>(&self, index: usize, mut extract: impl FnMut() -> Result<T>) -> Result<T> {
        retry_transient(
            self.settings.attempts,
            &format!("item {}", index + 1),
            || {
                self.select_item(index)?;
                extract()
            },
        )
    }
}
