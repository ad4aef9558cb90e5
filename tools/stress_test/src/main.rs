use anyhow::Context;
use crossbeam_channel::Receiver;
use std::thread;
use std::time::Instant;
use telemetry::TelemetryConfig;

const SERIAL_CALLS: usize = 10_000;
const CONCURRENCY: usize = 10;
const CALLS_PER_THREAD: usize = 100;
const TOTAL: usize = CONCURRENCY * CALLS_PER_THREAD;

/// Consecutive same-thread readings must never go backwards.
fn check_serial() -> anyhow::Result<()> {
    let mut prev = reltime::try_now().context("Relative clock unavailable")?;
    for i in 0..SERIAL_CALLS {
        let current = reltime::now();
        if current < prev {
            anyhow::bail!(
                "Time {} ({}) went backwards from time {} ({})",
                i,
                current,
                i as i64 - 1,
                prev
            );
        }
        prev = current;
    }

    let mut prev = Instant::now();
    for i in 0..SERIAL_CALLS {
        let current = Instant::now();
        if current < prev {
            anyhow::bail!("Instant {} went backwards", i);
        }
        prev = current;
    }
    Ok(())
}

/// Fan readings from `CONCURRENCY` threads into one channel, then count how
/// often the merged sequence steps backwards.
fn count_violations<T, F>(sample: F) -> usize
where
    T: PartialOrd + Send + 'static,
    F: Fn() -> T + Copy + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded::<T>(TOTAL);

    let handles: Vec<_> = (0..CONCURRENCY)
        .map(|i| {
            let tx = tx.clone();
            thread::Builder::new()
                .name(format!("sampler-{}", i))
                .spawn(move || {
                    for _ in 0..CALLS_PER_THREAD {
                        // Capacity is TOTAL and the receiver outlives us.
                        let _ = tx.send(sample());
                    }
                })
                .expect("Failed to spawn sampler thread")
        })
        .collect();
    drop(tx);

    for handle in handles {
        handle.join().expect("Sampler thread panicked");
    }

    violations(&rx)
}

fn violations<T: PartialOrd>(rx: &Receiver<T>) -> usize {
    let mut iter = rx.iter();
    let Some(mut prev) = iter.next() else {
        return 0;
    };

    let mut count = 0;
    for current in iter {
        if current < prev {
            count += 1;
        }
        prev = current;
    }
    count
}

fn main() -> anyhow::Result<()> {
    let _guard = telemetry::init(&TelemetryConfig::default())?;

    println!("Starting Relative Time Monotonicity Stress Test");
    println!("Serial calls: {}", SERIAL_CALLS);
    println!("Concurrent: {} threads x {} calls", CONCURRENCY, CALLS_PER_THREAD);

    let start = Instant::now();
    check_serial()?;
    println!("\nSerial: OK, {} readings non-decreasing", SERIAL_CALLS);

    // Interleaving across threads and the channel produces "violations" for
    // any clock; the numbers are only interesting relative to each other.
    let rviolations = count_violations(reltime::now);
    let iviolations = count_violations(Instant::now);

    let pct = |n: usize| 100 * n / (TOTAL - 1);

    println!("\n--- Concurrent Results ---");
    println!("reltime::now() violations: {}/{} ({}%)", rviolations, TOTAL - 1, pct(rviolations));
    println!("Instant::now() violations: {}/{} ({}%)", iviolations, TOTAL - 1, pct(iviolations));
    println!("Duration: {:.2?}", start.elapsed());

    if rviolations > 2 * iviolations || iviolations > 2 * rviolations {
        tracing::warn!(
            reltime = rviolations,
            instant = iviolations,
            "violation counts differ by more than 2x"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violations_counts_backward_steps() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for v in [1, 2, 2, 1, 3, 0, 5] {
            tx.send(v).unwrap();
        }
        drop(tx);

        assert_eq!(violations(&rx), 2);
    }

    #[test]
    fn test_violations_empty_channel() {
        let (tx, rx) = crossbeam_channel::unbounded::<i64>();
        drop(tx);
        assert_eq!(violations(&rx), 0);
    }

    #[test]
    fn test_serial_check_passes() {
        check_serial().expect("clock should be non-decreasing on one thread");
    }

    #[test]
    fn test_count_violations_collects_every_sample() {
        let n = count_violations(|| 7u8);
        assert_eq!(n, 0);
    }
}
