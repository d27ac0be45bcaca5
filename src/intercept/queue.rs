use std::collections::{vec_deque, VecDeque};

use super::exchange::{PendingExchange, ResourceId};

/// Strict FIFO of exchanges that arrived while another one was on display.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    entries: VecDeque<PendingExchange>,
}

impl PendingQueue {
    pub(crate) fn push_back(&mut self, exchange: PendingExchange) {
        self.entries.push_back(exchange);
    }

    pub(crate) fn pop_front(&mut self) -> Option<PendingExchange> {
        self.entries.pop_front()
    }

    /// Linear scan head-to-tail; depth is bounded by how fast a human clicks, not by traffic.
    pub(crate) fn find_mut(&mut self, id: ResourceId) -> Option<&mut PendingExchange> {
        self.entries
            .iter_mut()
            .find(|exchange| exchange.id() == id)
    }

    pub(crate) fn contains(&self, id: ResourceId) -> bool {
        self.entries
            .iter()
            .any(|exchange| exchange.id() == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> vec_deque::Iter<'_, PendingExchange> {
        self.entries.iter()
    }

    pub(crate) fn drain(&mut self) -> vec_deque::Drain<'_, PendingExchange> {
        self.entries.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::exchange::ResponseMeta;

    fn exchange(id: u64) -> PendingExchange {
        PendingExchange::new(ResourceId::new(id), "GET".to_string(), format!("http://host/{}", id), vec![])
    }

    fn ids(queue: &PendingQueue) -> Vec<u64> {
        queue.iter().map(|e| e.id().as_u64()).collect()
    }

    #[test]
    fn pops_in_arrival_order() {
        let mut queue = PendingQueue::default();
        queue.push_back(exchange(3));
        queue.push_back(exchange(1));
        queue.push_back(exchange(2));

        assert_eq!(queue.pop_front().map(|e| e.id().as_u64()), Some(3));
        assert_eq!(queue.pop_front().map(|e| e.id().as_u64()), Some(1));
        assert_eq!(queue.pop_front().map(|e| e.id().as_u64()), Some(2));
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn find_updates_in_place_without_reordering() {
        let mut queue = PendingQueue::default();
        for id in 1..=3 {
            queue.push_back(exchange(id));
        }

        let found = queue.find_mut(ResourceId::new(2)).expect("entry 2 must be queued");
        found.attach_response(ResponseMeta {
            status_code: 200,
            content_type: "text/plain".to_string(),
            headers: vec![],
        });

        assert_eq!(ids(&queue), vec![1, 2, 3]);
        let status = queue.iter().nth(1).and_then(|e| e.response()).map(|r| r.status_code);
        assert_eq!(status, Some(200));
    }

    #[test]
    fn missing_id_is_not_found() {
        let mut queue = PendingQueue::default();
        queue.push_back(exchange(1));

        assert!(queue.find_mut(ResourceId::new(9)).is_none());
        assert!(!queue.contains(ResourceId::new(9)));
        assert!(queue.contains(ResourceId::new(1)));
    }

    #[test]
    fn drain_empties_queue() {
        let mut queue = PendingQueue::default();
        queue.push_back(exchange(1));
        queue.push_back(exchange(2));

        let drained: Vec<u64> = queue.drain().map(|e| e.id().as_u64()).collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }
}
