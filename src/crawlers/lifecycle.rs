use crate::browser::{Browser, TabHandle};
use crate::error::CrawlError;
use crate::utils::close_with_timeout;
use std::sync::Arc;
use std::time::Duration;

/// A tab in use by one traversal step, and whether that step must close it
#[derive(Debug)]
#[must_use = "a lease must be handed back to PageLifecycle::release"]
pub struct PageLease {
    handle: TabHandle,
    owned: bool,
}

impl PageLease {
    pub fn handle(&self) -> TabHandle {
        self.handle
    }

    /// `true` when this lease created the tab and is responsible for closing it
    pub fn owned(&self) -> bool {
        self.owned
    }
}

/// Hands out tabs and closes the ones it created, never blocking for long
#[derive(Clone)]
pub struct PageLifecycle {
    browser: Arc<dyn Browser>,
    close_timeout: Duration,
}

impl PageLifecycle {
    pub fn new(browser: Arc<dyn Browser>, close_timeout: Duration) -> Self {
        Self {
            browser,
            close_timeout,
        }
    }

    pub fn browser(&self) -> &Arc<dyn Browser> {
        &self.browser
    }

    /// Borrow `parent` when given (the caller keeps ownership), otherwise
    /// open a fresh tab owned by the returned lease
    pub async fn acquire(&self, parent: Option<TabHandle>) -> Result<PageLease, CrawlError> {
        match parent {
            Some(handle) => Ok(PageLease {
                handle,
                owned: false,
            }),
            None => {
                let handle = self.browser.open_tab().await?;
                Ok(PageLease {
                    handle,
                    owned: true,
                })
            }
        }
    }

    /// Close the lease's tab if the lease owns it.
    ///
    /// Failures and timeouts are logged and swallowed.
    pub async fn release(&self, lease: PageLease) {
        if !lease.owned {
            return;
        }
        let what = lease.handle.to_string();
        close_with_timeout(&what, self.close_timeout, self.browser.close_tab(lease.handle)).await;
    }
}

/// Close the whole browsing session within `limit`.
///
/// Returns `false` if the session could not be closed in time.
pub async fn close_session(browser: &dyn Browser, limit: Duration) -> bool {
    close_with_timeout("browser session", limit, browser.close()).await
}
