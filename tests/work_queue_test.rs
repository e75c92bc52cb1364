//! Integration tests for the work queue's completion and shutdown guarantees.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use stemdex::error::Result;
use stemdex::work_queue::{Spawner, WorkQueue};

/// Spawn a binary tree of tasks `depth` levels deep.
fn fan_out(spawner: Spawner, depth: usize, done: Arc<AtomicUsize>) -> Result<()> {
    thread::sleep(Duration::from_millis(1));
    done.fetch_add(1, Ordering::SeqCst);
    if depth == 0 {
        return Ok(());
    }
    for _ in 0..2 {
        let child = spawner.clone();
        let done = Arc::clone(&done);
        spawner.execute(move || fan_out(child, depth - 1, done))?;
    }
    Ok(())
}

#[test]
fn test_finish_waits_for_transitively_spawned_tasks() -> Result<()> {
    let queue = WorkQueue::new(4)?;
    let done = Arc::new(AtomicUsize::new(0));

    let spawner = queue.spawner();
    let counter = Arc::clone(&done);
    queue.execute(move || fan_out(spawner, 6, counter))?;
    queue.finish();

    // 1 + 2 + 4 + ... + 64 tasks.
    assert_eq!(done.load(Ordering::SeqCst), 127);
    assert_eq!(queue.stats().completed, 127);
    Ok(())
}

#[test]
fn test_finish_is_reusable() -> Result<()> {
    let queue = WorkQueue::new(2)?;
    let done = Arc::new(AtomicUsize::new(0));

    for round in 1..=3 {
        for _ in 0..10 {
            let done = Arc::clone(&done);
            queue.execute(move || {
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
        }
        queue.finish();
        assert_eq!(done.load(Ordering::SeqCst), round * 10);
    }

    // Nothing pending: returns immediately.
    queue.finish();
    Ok(())
}

#[test]
fn test_no_task_runs_after_shutdown() -> Result<()> {
    let queue = WorkQueue::new(3)?;
    let shut_down = Arc::new(AtomicBool::new(false));
    let late_runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..30 {
        let shut_down = Arc::clone(&shut_down);
        let late_runs = Arc::clone(&late_runs);
        queue.execute(move || {
            thread::sleep(Duration::from_millis(2));
            if shut_down.load(Ordering::SeqCst) {
                late_runs.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        })?;
    }

    queue.shutdown();
    shut_down.store(true, Ordering::SeqCst);

    assert!(queue.execute(|| Ok(())).is_err());
    thread::sleep(Duration::from_millis(20));
    assert_eq!(late_runs.load(Ordering::SeqCst), 0);
    assert_eq!(queue.stats().completed, 30);
    Ok(())
}

#[test]
fn test_drop_drains_queue() -> Result<()> {
    let done = Arc::new(AtomicUsize::new(0));
    {
        let queue = WorkQueue::new(2)?;
        for _ in 0..8 {
            let done = Arc::clone(&done);
            queue.execute(move || {
                thread::sleep(Duration::from_millis(1));
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
        }
    }

    assert_eq!(done.load(Ordering::SeqCst), 8);
    Ok(())
}

#[test]
fn test_concurrent_submitters() -> Result<()> {
    let queue = Arc::new(WorkQueue::new(4)?);
    let done = Arc::new(AtomicUsize::new(0));

    thread::scope(|s| {
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            s.spawn(move || {
                for _ in 0..25 {
                    let done = Arc::clone(&done);
                    queue
                        .execute(move || {
                            done.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                }
            });
        }
    });
    queue.finish();

    assert_eq!(done.load(Ordering::SeqCst), 200);
    assert_eq!(queue.stats().submitted, 200);
    Ok(())
}
