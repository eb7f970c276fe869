use crate::load::error::LoadError;
use crate::schedule::error::ScheduleError;
use crate::transform::error::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Stage '{stage}' failed after {attempts} attempts")]
    RetriesExhausted {
        stage: String,
        attempts: u32,
        #[source]
        source: Box<EtlError>,
    },
}
