use thiserror::Error;
use tv_core::AgentId;
use tv_grid::GridError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("traveler {0} has no segments left")]
    EmptyBody(AgentId),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

pub type AgentResult<T> = Result<T, AgentError>;
