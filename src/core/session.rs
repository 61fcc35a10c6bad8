use crate::domain::ports::Driver;
use std::sync::atomic::{AtomicBool, Ordering};

/// Owns an automation driver for the duration of a run and quits it exactly
/// once, either on [`Session::close`] or when dropped.
pub struct Session<D: Driver> {
    driver: D,
    closed: AtomicBool,
}

impl<D: Driver> Session<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            closed: AtomicBool::new(false),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Closing the driver");
        if let Err(e) = self.driver.quit() {
            tracing::warn!("Driver did not shut down cleanly: {}", e);
        }
    }
}

impl<D: Driver> Drop for Session<D> {
    fn drop(&mut self) {
        self.close();
    }
}
