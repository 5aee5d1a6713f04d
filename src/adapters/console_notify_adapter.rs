//! Console notification adapter: prints the summary to stdout.
//!
//! Stands in for a real push channel; the scan only requires best-effort
//! delivery through the port.

use crate::domain::error::TrendscanError;
use crate::ports::notify_port::NotifyPort;

pub struct ConsoleNotifyAdapter;

impl ConsoleNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyPort for ConsoleNotifyAdapter {
    fn send(&self, text: &str) -> Result<(), TrendscanError> {
        println!("{}", text);
        Ok(())
    }
}
