// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Standing queries that push full snapshots.
//!
//! A subscription re-runs its query whenever the change hub reports a
//! write to its collection, and on a fixed poll interval to catch writes
//! made by other processes. A snapshot is pushed only when it differs from
//! the last one pushed. The background task is aborted when the
//! `Subscription` is dropped.

use crate::db::{FirestoreDb, Query};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Snapshots buffered ahead of a slow consumer.
const SNAPSHOT_BUFFER: usize = 4;

/// Shortest re-poll period; `interval_at` rejects a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Aborts the wrapped task when dropped.
///
/// Whatever the task would have produced after the owner goes away is
/// discarded.
pub struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    pub fn new(handle: JoinHandle<T>) -> Self {
        Self(handle)
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(PartialEq)]
enum Pushed {
    Nothing,
    Snapshot(Vec<Value>),
    Failure(String),
}

/// Live view over one query.
pub struct Subscription<T> {
    snapshots: mpsc::Receiver<Result<Vec<Value>, AppError>>,
    _task: AbortOnDrop<()>,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Subscription<T> {
    /// Start watching `query`. The first snapshot is pushed immediately.
    pub fn open(db: FirestoreDb, query: Query, poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let task = tokio::spawn(watch(db, query, poll_interval, tx));

        Self {
            snapshots: rx,
            _task: AbortOnDrop::new(task),
            _item: PhantomData,
        }
    }

    /// Wait for the next snapshot. `None` once the watcher has stopped.
    pub async fn next(&mut self) -> Option<Result<Vec<T>, AppError>> {
        let snapshot = self.snapshots.recv().await?;
        Some(snapshot.and_then(|docs| {
            docs.into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map_err(|e| AppError::Database(e.to_string()))
        }))
    }
}

async fn watch(
    db: FirestoreDb,
    query: Query,
    poll_interval: Duration,
    tx: mpsc::Sender<Result<Vec<Value>, AppError>>,
) {
    let collection = query.collection.path();
    let mut changes = db.subscribe_changes();
    let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
    let mut poll = interval_at(Instant::now() + poll_interval, poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Pushed::Nothing;

    tracing::debug!(query = %query.signature(), "Subscription opened");

    loop {
        let result: Result<Vec<Value>, AppError> = db.query(&query).await;
        let current = match &result {
            Ok(docs) => Pushed::Snapshot(docs.clone()),
            Err(e) => Pushed::Failure(e.to_string()),
        };

        if current != last {
            if let Err(e) = &result {
                tracing::warn!(query = %query.signature(), error = %e, "Subscription query failed");
            }
            if tx.send(result).await.is_err() {
                break;
            }
            last = current;
        }

        // Wait for something that may have changed the result
        let stop = loop {
            tokio::select! {
                _ = poll.tick() => break false,
                event = changes.recv() => match event {
                    Ok(event) if event.collection == collection => break false,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => break false,
                    Err(RecvError::Closed) => break true,
                },
                _ = tx.closed() => break true,
            }
        };
        if stop {
            break;
        }
    }

    tracing::debug!(query = %query.signature(), "Subscription closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerRequest;
    use chrono::Utc;

    #[tokio::test]
    async fn test_write_pushes_new_snapshot() {
        let db = FirestoreDb::new_in_memory();
        let mut sub: Subscription<PrayerRequest> = Subscription::open(
            db.clone(),
            FirestoreDb::prayer_wall_query(),
            Duration::from_secs(3600),
        );

        assert!(sub.next().await.unwrap().unwrap().is_empty());

        let prayer = PrayerRequest::new("Peace".to_string(), "u1".to_string(), true, Utc::now());
        db.create_prayer(&prayer).await.unwrap();

        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text, "Peace");
    }

    #[tokio::test]
    async fn test_unrelated_write_pushes_nothing() {
        let db = FirestoreDb::new_in_memory();
        let mut sub: Subscription<PrayerRequest> = Subscription::open(
            db.clone(),
            FirestoreDb::prayer_wall_query(),
            Duration::from_secs(3600),
        );
        sub.next().await.unwrap().unwrap();

        // Private prayers do not change the wall
        let private = PrayerRequest::new("Quiet".to_string(), "u1".to_string(), false, Utc::now());
        db.create_prayer(&private).await.unwrap();

        let pending = tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
        assert!(pending.is_err(), "no snapshot expected");
    }

    #[tokio::test]
    async fn test_zero_poll_interval_still_delivers() {
        let db = FirestoreDb::new_in_memory();
        let mut sub: Subscription<PrayerRequest> =
            Subscription::open(db.clone(), FirestoreDb::prayer_wall_query(), Duration::ZERO);

        let first = tokio::time::timeout(Duration::from_secs(2), sub.next())
            .await
            .expect("first snapshot")
            .expect("watcher running");
        assert!(first.unwrap().is_empty());

        let prayer = PrayerRequest::new("Rain".to_string(), "u1".to_string(), true, Utc::now());
        db.create_prayer(&prayer).await.unwrap();

        let next = tokio::time::timeout(Duration::from_secs(2), sub.next())
            .await
            .expect("second snapshot")
            .expect("watcher running");
        assert_eq!(next.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_aborts_watcher() {
        let handle = tokio::spawn(std::future::pending::<()>());
        let guard = AbortOnDrop::new(handle);
        assert!(!guard.is_finished());

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let watched = tokio::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        });
        drop(AbortOnDrop::new(watched));
        // The sender is dropped once the task is aborted
        assert!(rx.await.is_err());
        drop(guard);
    }
}
