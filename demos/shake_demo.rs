//! Demonstration of shake-to-lock without live input.
//!
//! This example shows how to:
//! 1. Create a lock controller with an activity log
//! 2. Subscribe to lock events from another thread
//! 3. Feed a synthetic pointer trace
//! 4. Unlock with a click
//!
//! Run with: cargo run --example shake_demo

use std::thread;

use shakelock::{
    core::{LockController, LockEventKind, ShakeDetectorConfig},
    stats::create_shared_log,
    PointerEvent,
};

/// A slow drift followed by a vigorous left-right shake and a click.
fn synthetic_trace() -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let mut t = 0.0;

    for i in 0..20 {
        events.push(PointerEvent::Move {
            x: 400.0 + i as f64 * 3.0,
            timestamp_ms: t,
        });
        t += 16.0;
    }

    for i in 0..12 {
        events.push(PointerEvent::Move {
            x: if i % 2 == 0 { 300.0 } else { 520.0 },
            timestamp_ms: t,
        });
        t += 35.0;
    }

    t += 1500.0;
    events.push(PointerEvent::Click { timestamp_ms: t });
    events
}

fn main() {
    println!("shakelock - Shake Demo");
    println!("======================");
    println!();

    let activity = create_shared_log();
    let mut controller = match LockController::new(ShakeDetectorConfig::default(), true) {
        Ok(controller) => controller.with_activity_log(activity.clone()),
        Err(e) => {
            eprintln!("Invalid detector config: {e}");
            return;
        }
    };

    // Stand-in for the overlay / audio cue living on another thread.
    let receiver = controller.subscribe();
    let listener = thread::spawn(move || {
        for event in receiver {
            match event.kind {
                LockEventKind::Locked => println!("  [overlay] show lock screen ({:?})", event.trigger),
                LockEventKind::Unlocked => println!("  [overlay] hide lock screen"),
            }
        }
    });

    for event in synthetic_trace() {
        match event {
            PointerEvent::Move { x, timestamp_ms } => {
                if let Some(lock) = controller.pointer_moved(x, timestamp_ms) {
                    println!("Shake detected at {timestamp_ms:.0}ms -> {}", lock.state());
                }
            }
            PointerEvent::Click { timestamp_ms } => {
                if let Some(unlock) = controller.unlock_input() {
                    println!("Click at {timestamp_ms:.0}ms -> {}", unlock.state());
                }
            }
        }
    }

    // Dropping the controller closes the subscription.
    drop(controller);
    let _ = listener.join();

    println!();
    println!("{}", activity.summary());
    println!();
    println!("Demo complete!");
}
