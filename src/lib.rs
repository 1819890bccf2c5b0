//! # Ordini - Memory-Ordering Counter Race Harness
//!
//! A small harness that drives many threads incrementing shared counters under
//! different synchronization disciplines, and checks whether each final tally
//! matches the theoretical count. It exists to make the effect of
//! synchronization choices observable under real contention.
//!
//! ## The Experiment
//!
//! For every discipline, `threads` workers each increment one shared counter
//! `iterations` times. A sampler thread periodically prints every counter
//! while the workers run. Once all workers have joined, the final values are
//! compared against `threads × iterations`.
//!
//! ```text
//!                    ┌──────────────────────────────────────┐
//!   workers ──inc──► │ unsynchronized │ mutex │ seq_cst │ … │ ◄──read── sampler
//!                    └──────────────────────────────────────┘
//!                                       │
//!                                       ▼
//!                       final snapshot vs threads × iterations
//! ```
//!
//! ## What To Expect
//!
//! | Discipline | Final value |
//! |------------|-------------|
//! | `unsynchronized` | `<= expected`, usually less under contention |
//! | `mutex` | `== expected` |
//! | `seq_cst`, `relaxed`, `release`, `acquire` | `== expected` |
//!
//! Every atomic ordering reaches the exact count. A fetch-and-add is atomic
//! whatever its ordering tag; the tag only decides how *other* memory
//! operations are ordered around the increment. A counter that publishes no
//! other data cannot tell `Relaxed` from `SeqCst`.
//!
//! The unsynchronized counter is written as a relaxed load followed by a
//! relaxed store. That keeps the program free of undefined behavior while
//! leaving the lost-update window of a plain `counter += 1` wide open. Its
//! final value is best-effort: tests only ever assert the upper bound.
//!
//! ## Quick Start
//!
//! ```rust
//! use ordini::config::RunConfig;
//! use ordini::coordinator::Coordinator;
//! use ordini::discipline::Discipline;
//! use ordini::sink::Recorder;
//!
//! let config = RunConfig::new(4, 100)?;
//! let report = Coordinator::new(config).run(&Recorder::new());
//!
//! assert_eq!(report.expected, 400);
//! assert_eq!(report.snapshot.get(Discipline::Mutex), Some(400));
//! assert!(report.is_consistent());
//! # Ok::<(), ordini::error::ConfigError>(())
//! ```
//!
//! ## Observers
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `table` | [`observers::table`] | Render snapshots as tables (default) |
//! | `json` | `observers::json` | Serialize snapshots and reports to JSON |
//! | `full` | All observers | Enables all observer modules |
//!
//! The `demo` feature builds the `harness` command-line front end:
//!
//! ```bash
//! cargo run --release --example harness --features demo -- --threads 8 --iterations 1000000
//! ```

pub mod bank;
pub mod config;
pub mod coordinator;
pub mod counters;
pub mod discipline;
pub mod error;
pub mod observers;
pub mod sampler;
pub mod sink;
pub mod snapshot;
pub mod worker;
