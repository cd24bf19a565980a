pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{var} is not a usable connection string: {message}")]
	InvalidEnv { var: &'static str, message: String },
	#[error("Postgres fixture failed to {step}: {source}")]
	Postgres { step: &'static str, source: sqlx::Error },
	#[error("Qdrant fixture failed to {step}: {source}")]
	Qdrant { step: &'static str, source: Box<qdrant_client::QdrantError> },
	#[error("Timed out {step}.")]
	Timeout { step: String },
	#[error("Seed payload for point {id} must be a JSON object.")]
	InvalidPayload { id: u64 },
}

pub(crate) fn pg(step: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
	move |source| Error::Postgres { step, source }
}

pub(crate) fn qdrant(step: &'static str) -> impl FnOnce(qdrant_client::QdrantError) -> Error {
	move |source| Error::Qdrant { step, source: Box::new(source) }
}
