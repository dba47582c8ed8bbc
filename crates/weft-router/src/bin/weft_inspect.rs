//! # weft-inspect
//!
//! Parses a router description, runs both configuration phases, and prints
//! the resolved weight and ticket assignment of every schedulable element.
//!
//! The description is one declaration per line, `NAME :: CLASS` or
//! `NAME :: CLASS(ARG, ARG, ...)`; `#` starts a comment. `ScheduleInfo`
//! declarations feed the schedule map; every other declaration is treated as
//! a schedulable stage.
//!
//! ## Usage
//!
//! ```bash
//! # Inspect a description file
//! weft-inspect router.weft
//!
//! # Read from stdin, emit JSON
//! echo 'src :: Source
//! sched :: ScheduleInfo(src 2)' | weft-inspect --json
//!
//! # Drop warnings about directives naming unknown elements
//! weft-inspect --ignore-unresolved router.weft
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, bail};
use serde::Serialize;
use weft_common::report::LogReporter;
use weft_router::graph::{ElementClass, Router};
use weft_router::schedule::UnresolvedPolicy;

struct Args {
    json: bool,
    policy: UnresolvedPolicy,
    input: Option<PathBuf>,
}

#[derive(Serialize)]
struct Row<'a> {
    element: &'a str,
    weight: f64,
    tickets: u32,
    stride: u32,
}

fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = parse_args()?;

    // ── Input ───────────────────────────────────────────────────
    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    // ── Configure ───────────────────────────────────────────────
    let router = parse_router(&text)?;
    let mut reporter = LogReporter::new();
    let configured = router.configure(args.policy, &mut reporter);

    // ── Report ──────────────────────────────────────────────────
    let rows: Vec<Row> = configured
        .queue
        .entries()
        .iter()
        .map(|entry| Row {
            element: entry.name.as_str(),
            weight: configured.schedule.resolve(&entry.name),
            tickets: entry.tickets,
            stride: entry.stride,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:<28} {:>10} {:>8} {:>8}", "ELEMENT", "WEIGHT", "TICKETS", "STRIDE");
        for row in &rows {
            println!(
                "{:<28} {:>10.4} {:>8} {:>8}",
                row.element, row.weight, row.tickets, row.stride
            );
        }
        println!(
            "{} element(s), {} total tickets",
            rows.len(),
            configured.queue.total_tickets()
        );
    }

    if reporter.error_count() > 0 {
        bail!("{} configuration error(s)", reporter.error_count());
    }
    Ok(())
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        json: false,
        policy: UnresolvedPolicy::Warn,
        input: None,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => args.json = true,
            "--ignore-unresolved" => args.policy = UnresolvedPolicy::Ignore,
            "-h" | "--help" => {
                println!(
                    "Usage: weft-inspect [--json] [--ignore-unresolved] [FILE]\n\
                     Reads a router description from FILE (or stdin) and prints\n\
                     the resolved scheduler ticket table."
                );
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown flag {flag:?}"),
            path => {
                if args.input.is_some() {
                    bail!("multiple input files");
                }
                args.input = Some(PathBuf::from(path));
            }
        }
    }
    Ok(args)
}

/// Parse `NAME :: CLASS(ARGS)` declarations into a router graph.
fn parse_router(text: &str) -> anyhow::Result<Router> {
    let mut router = Router::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let lineno = idx + 1;
        let (name, decl) = line
            .split_once("::")
            .with_context(|| format!("line {lineno}: expected `NAME :: CLASS`"))?;
        let (class, class_args) = match decl.trim().split_once('(') {
            Some((class, tail)) => {
                let inner = tail
                    .strip_suffix(')')
                    .with_context(|| format!("line {lineno}: missing `)`"))?;
                let class_args = inner
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                (class.trim(), class_args)
            }
            None => (decl.trim(), Vec::new()),
        };
        let class = if class == "ScheduleInfo" {
            ElementClass::ScheduleInfo { args: class_args }
        } else {
            ElementClass::Schedulable
        };
        router
            .add_element(name.trim(), class)
            .with_context(|| format!("line {lineno}"))?;
    }
    Ok(router)
}
