//! CLI that resolves URLs against the built-in rules and prints JSON lines.
//!
//! URLs come from the arguments, or one per line on stdin when none are
//! given. Set `RUST_LOG=debug` to see matching decisions on stderr.

use std::io::{self, BufRead};
use std::process::ExitCode;

use rs_siteconfig::{rules, Resolver};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct Failure<'a> {
    url: &'a str,
    error: String,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let resolver = match rules::builtin() {
        Ok(registry) => Resolver::new(registry),
        Err(err) => {
            eprintln!("Failed to load built-in rules: {err}");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let urls: Vec<String> = if args.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .map_while(Result::ok)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    } else {
        args
    };

    let mut failed = false;
    for url in &urls {
        let line = match resolver.resolve(url) {
            Ok(resolution) => serde_json::to_string(&resolution),
            Err(err) => {
                failed = true;
                serde_json::to_string(&Failure {
                    url,
                    error: err.to_string(),
                })
            }
        };
        println!("{}", line.unwrap_or_default());
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
