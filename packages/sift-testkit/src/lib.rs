//! Disposable stores for the ignored integration tests: a pgvector database with the
//! `match_documents` fixture, and uniquely named Qdrant collections.

mod error;
mod postgres;
mod qdrant;

pub use error::{Error, Result};
pub use postgres::TestDatabase;
pub use qdrant::{SeedPoint, TestCollections};

use std::{env, future::Future, thread};

use tokio::runtime::Builder;

pub const PG_DSN_VAR: &str = "SIFT_PG_DSN";
pub const QDRANT_URL_VAR: &str = "SIFT_QDRANT_URL";

pub fn env_dsn() -> Option<String> {
	env::var(PG_DSN_VAR).ok()
}

pub fn env_qdrant_url() -> Option<String> {
	env::var(QDRANT_URL_VAR).ok()
}

/// Runs async cleanup from `Drop` on its own thread and runtime, so it works while the test's
/// runtime is blocked or unwinding.
fn run_detached<F>(label: &'static str, cleanup: F)
where
	F: Future<Output = Result<()>> + Send + 'static,
{
	let worker = thread::spawn(move || {
		let outcome = Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|err| err.to_string())
			.and_then(|runtime| runtime.block_on(cleanup).map_err(|err| err.to_string()));

		if let Err(err) = outcome {
			eprintln!("{label} failed: {err}");
		}
	});

	let _ = worker.join();
}
