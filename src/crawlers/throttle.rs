use std::time::Duration;

/// Fixed politeness delay observed before each child-link visit
#[derive(Debug, Clone, Copy)]
pub struct ThrottleGate {
    delay: Duration,
}

impl ThrottleGate {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        ::log::trace!("Throttling for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
