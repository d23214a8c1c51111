use crate::alert::{Alert, AlertSink};
use crate::feed::types::NotificationItem;
use std::collections::{HashSet, VecDeque};

/// Notification ids already alerted on during this process.
pub struct SeenSet {
    ids: HashSet<String>,
    /// Insertion order, only kept when a cap is set.
    order: VecDeque<String>,
    max_entries: Option<usize>,
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenSet {
    pub fn new() -> Self {
        Self::with_capacity_limit(None)
    }

    /// `Some(n)` evicts the oldest-inserted id once more than `n` are held.
    pub fn with_capacity_limit(max_entries: Option<usize>) -> Self {
        Self {
            ids: HashSet::new(),
            order: VecDeque::new(),
            max_entries,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: String) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        if let Some(max) = self.max_entries {
            self.order.push_back(id.clone());
            while self.order.len() > max {
                if let Some(oldest) = self.order.pop_front() {
                    self.ids.remove(&oldest);
                }
            }
        }
        self.ids.insert(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Alert on every item whose id has not been seen, in the order given.
/// Returns the number of alerts dispatched.
pub async fn reconcile(
    items: &[NotificationItem],
    seen: &mut SeenSet,
    sink: &dyn AlertSink,
) -> usize {
    let mut dispatched = 0;
    for item in items {
        if !seen.insert(item.id.clone()) {
            continue;
        }
        let alert = Alert::for_item(item);
        tracing::info!(id = %item.id, "{}", alert.summary);
        if let Err(e) = sink.notify(&alert).await {
            tracing::warn!(id = %item.id, error = %e, "failed to show desktop alert");
        }
        dispatched += 1;
    }
    dispatched
}
