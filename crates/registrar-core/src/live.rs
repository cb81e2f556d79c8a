//! Live snapshot streams.
//!
//! A [`Live`] is the observable-query primitive of the data layer: a
//! push-based sequence that yields the current result set immediately on
//! subscription and a fresh snapshot after every relevant write, until the
//! consumer drops it or the publisher goes away.

use tokio::sync::watch;

/// A live view over a single value (usually a query snapshot).
///
/// Backed by a [`watch`] channel, so a slow consumer only ever sees the
/// latest snapshot — intermediate ones are skipped, never reordered.
#[derive(Debug)]
pub struct Live<T> {
  rx: watch::Receiver<T>,
}

impl<T: Clone> Live<T> {
  /// Wrap a watch receiver. The value current at wrap time is delivered by
  /// the first [`next`](Live::next) call even if the receiver had already
  /// seen it.
  pub fn new(mut rx: watch::Receiver<T>) -> Self {
    rx.mark_changed();
    Self { rx }
  }

  /// The latest snapshot, without consuming it from the stream.
  pub fn current(&self) -> T {
    self.rx.borrow().clone()
  }

  /// Wait for the next snapshot. Returns `None` once the publisher has been
  /// dropped; dropping `self` instead cancels the subscription.
  pub async fn next(&mut self) -> Option<T> {
    self.rx.changed().await.ok()?;
    Some(self.rx.borrow_and_update().clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn first_next_yields_the_current_value() {
    let (tx, rx) = watch::channel(1u32);
    let mut live = Live::new(rx);
    assert_eq!(live.next().await, Some(1));

    tx.send_replace(2);
    assert_eq!(live.next().await, Some(2));
  }

  #[tokio::test]
  async fn next_ends_when_the_publisher_is_dropped() {
    let (tx, rx) = watch::channel(0u32);
    let mut live = Live::new(rx);
    assert_eq!(live.next().await, Some(0));

    drop(tx);
    assert_eq!(live.next().await, None);
  }

  #[tokio::test]
  async fn slow_consumers_see_only_the_latest_snapshot() {
    let (tx, rx) = watch::channel(0u32);
    let mut live = Live::new(rx);
    assert_eq!(live.next().await, Some(0));

    tx.send_replace(1);
    tx.send_replace(2);
    assert_eq!(live.next().await, Some(2));
    assert_eq!(live.current(), 2);
  }
}
