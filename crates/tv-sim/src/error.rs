use thiserror::Error;
use tv_agent::AgentError;
use tv_core::{AgentId, TvError};
use tv_grid::GridError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] TvError),

    #[error("layout has {got} travelers but agent_count is {expected}")]
    TravelerCountMismatch { expected: u32, got: usize },

    #[error("no free cell left for {what}")]
    NoFreeCell { what: &'static str },

    #[error("grid error during layout: {0}")]
    Grid(#[from] GridError),

    #[error("simulation already started")]
    AlreadyStarted,

    #[error("could not spawn traveler thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("traveler {agent} stopped with an error: {source}")]
    Agent {
        agent:  AgentId,
        #[source]
        source: AgentError,
    },

    #[error("traveler {0} thread panicked")]
    ThreadPanicked(AgentId),
}

pub type SimResult<T> = Result<T, SimError>;
