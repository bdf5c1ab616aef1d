use std::fmt;

type Unsubscriber = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a live subscription.
///
/// Unsubscribes when [`Subscription::unsubscribe`] is called or when the handle
/// is dropped. Once either returns, the callback will not run again.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscriber: Option<Unsubscriber>,
}

impl Subscription {
    pub fn new<F>(unsubscriber: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Subscription {
            unsubscriber: Some(Box::new(unsubscriber)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(unsubscriber) = self.unsubscriber.take() {
            unsubscriber();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscriber.is_some())
            .finish()
    }
}
