use aws_config::BehaviorVersion;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;

#[derive(Default)]
struct Stats {
    success_count: usize,
    mismatch_count: usize,
    error_count: usize,
    total_latency_ms: f64,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Success,
    Mismatch,
    Error,
}

#[derive(Parser, Debug)]
#[command(name = "invoke-greeting")]
#[command(about = "Invoke the greeting Lambda function with random payloads")]
struct Args {
    /// Lambda function name
    function: String,

    /// Number of iterations to run
    #[arg(long, default_value = "100")]
    iters: usize,

    /// Number of parallel threads
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Greeting the function is configured with; responses are checked against it
    #[arg(long)]
    expect: Option<String>,
}

/// Splits iterations `1..=iters` into at most `threads` contiguous ranges, the
/// last range taking the remainder. Empty ranges are left out.
fn split_iterations(iters: usize, threads: usize) -> Vec<RangeInclusive<usize>> {
    let per_thread = iters / threads;
    let remainder = iters % threads;

    let mut ranges = Vec::with_capacity(threads);
    let mut start = 1;
    for t in 1..=threads {
        let len = if t == threads {
            per_thread + remainder
        } else {
            per_thread
        };
        if len > 0 {
            ranges.push(start..=start + len - 1);
            start += len;
        }
    }
    ranges
}

/// Sorts an invocation result into success, mismatch or function error.
/// `function_error` is the `X-Amz-Function-Error` value reported by the service.
fn classify(response_payload: &str, function_error: Option<&str>, expect: Option<&str>) -> Outcome {
    if function_error.is_some() {
        return Outcome::Error;
    }

    let Some(greeting) = expect else {
        return Outcome::Success;
    };

    // The function returns a bare string, so the payload is a JSON string literal.
    match serde_json::from_str::<String>(response_payload) {
        Ok(response) if response == format!("{greeting} from Lambda!") => Outcome::Success,
        _ => Outcome::Mismatch,
    }
}

async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    expect: Option<String>,
    thread_id: usize,
    iterations: RangeInclusive<usize>,
    total: usize,
    stats: Arc<Mutex<Stats>>,
) {
    let mut rng = StdRng::from_entropy();

    for i in iterations {
        // Random content; the greeting must not depend on it
        let payload = serde_json::json!({
            "iteration": i,
            "value": rng.gen::<u32>(),
        });

        let started = Instant::now();
        let result = client
            .invoke()
            .function_name(&function_name)
            .payload(Blob::new(payload.to_string()))
            .send()
            .await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(response) => {
                let response_payload = response
                    .payload()
                    .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
                    .unwrap_or_else(|| "No response".to_string());

                let outcome = classify(
                    &response_payload,
                    response.function_error(),
                    expect.as_deref(),
                );

                {
                    let mut stats = stats.lock().await;
                    match outcome {
                        Outcome::Success => {
                            stats.success_count += 1;
                            stats.total_latency_ms += latency_ms;
                        }
                        Outcome::Mismatch => stats.mismatch_count += 1,
                        Outcome::Error => stats.error_count += 1,
                    }
                }

                println!(
                    "[Thread {}: {}/{}] {} => {} ({:?}, {:.3}ms)",
                    thread_id, i, total, payload, response_payload, outcome, latency_ms
                );
            }
            Err(e) => {
                {
                    let mut stats = stats.lock().await;
                    stats.error_count += 1;
                }

                eprintln!(
                    "[Thread {}: {}/{}] Error invoking with {}: {}",
                    thread_id, i, total, payload, e
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.threads > 0, "--threads must be at least 1");

    println!(
        "Running {} invocations across {} thread(s)",
        args.iters, args.threads
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    let ranges = split_iterations(args.iters, args.threads);
    let total_iters = args.iters;

    let mut tasks = JoinSet::new();
    for (t, iterations) in ranges.into_iter().enumerate() {
        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let expect = args.expect.clone();
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            run_invocations(
                client,
                function_name,
                expect,
                t + 1,
                iterations,
                total_iters,
                stats,
            )
            .await;
        });
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            eprintln!("Task failed: {}", e);
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} invocations", args.iters);
    println!();
    println!("Results:");
    println!("  Success:    {}", stats.success_count);
    println!("  Mismatches: {}", stats.mismatch_count);
    println!("  Errors:     {}", stats.error_count);
    if stats.success_count > 0 {
        let avg_latency = stats.total_latency_ms / stats.success_count as f64;
        println!("  Avg latency: {:.3}ms", avg_latency);
    }

    anyhow::ensure!(
        stats.mismatch_count == 0 && stats.error_count == 0,
        "{} mismatched and {} failed invocations",
        stats.mismatch_count,
        stats.error_count
    );

    Ok(())
}
