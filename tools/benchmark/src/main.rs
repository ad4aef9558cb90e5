mod config;

use anyhow::Context;
use config::RunConfig;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use reltime::RelativeTime;
use std::hint::black_box;
use std::thread;
use std::time::Instant;

/// Arithmetic is too fast to time one call at a time.
const BATCH: usize = 1_000;

fn new_histogram() -> anyhow::Result<Histogram<u64>> {
    // Up to 100ms
    Histogram::<u64>::new_with_bounds(1, 100_000_000, 3).context("Failed to create histogram")
}

fn bench_now_serial(run: &RunConfig) -> anyhow::Result<Histogram<u64>> {
    let mut hist = new_histogram()?;

    println!("Running now() Benchmark ({} iterations)...", run.iterations);

    for _ in 0..run.iterations {
        let start = Instant::now();
        black_box(reltime::now());
        hist.saturating_record(start.elapsed().as_nanos() as u64);
    }
    Ok(hist)
}

fn bench_now_parallel(run: &RunConfig) -> anyhow::Result<Histogram<u64>> {
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();
    let threads = match run.threads {
        0 => core_ids.len().max(1),
        n => n,
    };
    let per_thread = run.iterations / threads;

    println!(
        "Running Parallel now() Benchmark ({} threads x {} iterations)...",
        threads, per_thread
    );

    let merged = Mutex::new(new_histogram()?);

    thread::scope(|s| -> anyhow::Result<()> {
        let mut handles = Vec::with_capacity(threads);
        for i in 0..threads {
            let core = if run.pin_cores { core_ids.get(i).copied() } else { None };
            let merged = &merged;
            handles.push(s.spawn(move || -> anyhow::Result<()> {
                if let Some(core_id) = core {
                    if !core_affinity::set_for_current(core_id) {
                        tracing::warn!(core = core_id.id, "failed to pin benchmark thread");
                    }
                }

                let mut local = new_histogram()?;
                for _ in 0..per_thread {
                    let start = Instant::now();
                    black_box(reltime::now());
                    local.saturating_record(start.elapsed().as_nanos() as u64);
                }

                merged.lock().add(&local).context("Failed to merge histogram")?;
                Ok(())
            }));
        }

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("Benchmark thread panicked"))??;
        }
        Ok(())
    })?;

    Ok(merged.into_inner())
}

fn bench_add(run: &RunConfig) -> anyhow::Result<Histogram<u64>> {
    let mut hist = new_histogram()?;
    let now = reltime::now();
    let shift = chrono::Duration::seconds(1);

    println!("Running add() Benchmark ({} iterations)...", run.iterations);

    for _ in 0..run.iterations / BATCH {
        let start = Instant::now();
        for _ in 0..BATCH {
            black_box(black_box(now).add(black_box(shift)));
        }
        hist.saturating_record(start.elapsed().as_nanos() as u64);
    }
    Ok(hist)
}

fn bench_sub(run: &RunConfig) -> anyhow::Result<Histogram<u64>> {
    let mut hist = new_histogram()?;
    let earlier = reltime::now();
    thread::sleep(std::time::Duration::from_micros(1));
    let later = reltime::now();

    println!("Running sub() Benchmark ({} iterations)...", run.iterations);

    for _ in 0..run.iterations / BATCH {
        let start = Instant::now();
        for _ in 0..BATCH {
            black_box(black_box(later).sub(black_box(earlier)));
        }
        hist.saturating_record(start.elapsed().as_nanos() as u64);
    }
    Ok(hist)
}

fn print_stats(name: &str, unit: &str, hist: &Histogram<u64>) {
    println!("\n--- {} Results ({}) ---", name, unit);
    println!("Samples: {}", hist.len());
    println!("Min:    {}", hist.min());
    println!("p50:    {}", hist.value_at_quantile(0.50));
    println!("p95:    {}", hist.value_at_quantile(0.95));
    println!("p99:    {}", hist.value_at_quantile(0.99));
    println!("Max:    {}", hist.max());
    println!("Mean:   {:.2}", hist.mean());
}

fn main() -> anyhow::Result<()> {
    let config = config::load("benchmark.toml")?;
    let _guard = telemetry::init(&config.telemetry)?;

    // Touch the clock before timing anything so epoch capture is not measured.
    let origin: RelativeTime = reltime::try_now().context("Relative clock unavailable")?;
    tracing::info!(epoch = %reltime::epoch(), origin = %origin, "benchmark starting");

    let serial = bench_now_serial(&config.run)?;
    print_stats("now() Serial", "ns/call", &serial);

    let parallel = bench_now_parallel(&config.run)?;
    print_stats("now() Parallel", "ns/call", &parallel);

    let add = bench_add(&config.run)?;
    print_stats("add()", "ns per 1000 calls", &add);

    let sub = bench_sub(&config.run)?;
    print_stats("sub()", "ns per 1000 calls", &sub);

    tracing::info!(elapsed = %origin.elapsed(), "benchmark finished");
    Ok(())
}
