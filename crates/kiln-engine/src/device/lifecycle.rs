//! Platform → device notifications.
//!
//! Window and GPU callbacks may fire at any time and from any thread; they
//! only enqueue. The frame loop drains the queue at the frame boundary, so
//! state changes never interleave with submission.

use std::sync::mpsc::{self, Receiver, Sender};

use super::SurfaceSize;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleEvent {
    Resized(SurfaceSize),
    DeviceLost,
}

/// Clonable, thread-safe handle for reporting lifecycle events.
#[derive(Debug, Clone)]
pub struct LifecycleSender {
    tx: Sender<LifecycleEvent>,
}

impl LifecycleSender {
    pub fn send(&self, event: LifecycleEvent) {
        // The manager is gone; nothing left to notify.
        if self.tx.send(event).is_err() {
            log::debug!("lifecycle event {event:?} dropped: receiver closed");
        }
    }

    #[inline]
    pub fn resized(&self, size: SurfaceSize) {
        self.send(LifecycleEvent::Resized(size));
    }

    #[inline]
    pub fn device_lost(&self) {
        self.send(LifecycleEvent::DeviceLost);
    }
}

/// Result of draining the queue: the last size seen and whether loss was reported.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PendingLifecycle {
    pub resize: Option<SurfaceSize>,
    pub device_lost: bool,
}

impl PendingLifecycle {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && !self.device_lost
    }
}

#[derive(Debug)]
pub struct LifecycleQueue {
    rx: Receiver<LifecycleEvent>,
}

impl LifecycleQueue {
    /// Takes everything queued so far, coalescing resizes to the last one.
    pub fn drain(&self) -> PendingLifecycle {
        let mut pending = PendingLifecycle::default();
        for event in self.rx.try_iter() {
            match event {
                LifecycleEvent::Resized(size) => pending.resize = Some(size),
                LifecycleEvent::DeviceLost => pending.device_lost = true,
            }
        }
        pending
    }
}

pub fn channel() -> (LifecycleSender, LifecycleQueue) {
    let (tx, rx) = mpsc::channel();
    (LifecycleSender { tx }, LifecycleQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resizes_coalesce_to_last() {
        let (tx, queue) = channel();
        tx.resized(SurfaceSize::new(100, 100));
        tx.resized(SurfaceSize::new(0, 0));
        tx.resized(SurfaceSize::new(640, 480));

        let pending = queue.drain();
        assert_eq!(pending.resize, Some(SurfaceSize::new(640, 480)));
        assert!(!pending.device_lost);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn loss_survives_later_resizes() {
        let (tx, queue) = channel();
        let from_other_thread = tx.clone();
        std::thread::spawn(move || from_other_thread.device_lost())
            .join()
            .unwrap();
        tx.resized(SurfaceSize::new(8, 8));

        let pending = queue.drain();
        assert!(pending.device_lost);
        assert_eq!(pending.resize, Some(SurfaceSize::new(8, 8)));
    }

    #[test]
    fn send_after_queue_drop_is_silent() {
        let (tx, queue) = channel();
        drop(queue);
        tx.device_lost();
    }
}
