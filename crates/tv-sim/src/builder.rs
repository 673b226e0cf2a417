//! Fluent builder for constructing a [`Sim`].

use std::sync::{Arc, OnceLock};

use tracing::info;

use tv_agent::{MovePolicy, Traveler, TravelerTask};
use tv_core::{AgentId, AgentRng, Color, SimConfig, SimRng};
use tv_grid::World;

use crate::layout::{self, Layout};
use crate::sim::Shared;
use crate::{Coordinator, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                                        |
/// |------------------|------------------------------------------------|
/// | `.layout(l)`     | Random exit, walls and partitions from `seed`  |
/// | `.colors(v)`     | `Color::palette(agent_count)`                  |
/// | `.stack_size(b)` | The platform default for spawned threads       |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config).build()?;
/// sim.start()?;
/// sim.observe(Duration::from_millis(100), &mut NoopObserver);
/// let status = sim.join()?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    layout:     Option<Layout>,
    colors:     Option<Vec<Color>>,
    stack_size: Option<usize>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, layout: None, colors: None, stack_size: None }
    }

    /// Use an explicit layout instead of a random one.
    ///
    /// If the layout lists travelers there must be exactly `agent_count` of
    /// them; otherwise travelers are placed on random free cells.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Per-traveler colors, cycled if shorter than `agent_count`.
    pub fn colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Stack size, in bytes, of every traveler thread.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Validate the configuration, lay out the world, place every traveler
    /// and return an idle [`Sim`].  No thread is spawned yet.
    pub fn build(self) -> SimResult<Sim> {
        let config = self.config;
        config.validate()?;

        let mut rng = SimRng::new(config.seed);
        let mut world = World::new(config.rows, config.cols);

        // ── Static layout ─────────────────────────────────────────────────
        let starts = match &self.layout {
            Some(explicit) => {
                if !explicit.travelers.is_empty()
                    && explicit.travelers.len() != config.agent_count as usize
                {
                    return Err(SimError::TravelerCountMismatch {
                        expected: config.agent_count,
                        got:      explicit.travelers.len(),
                    });
                }
                explicit.apply(&mut world)?;
                explicit.travelers.clone()
            }
            None => {
                layout::generate(&mut world, &mut rng)?;
                Vec::new()
            }
        };

        // ── Travelers ─────────────────────────────────────────────────────
        let palette = match self.colors {
            Some(c) if !c.is_empty() => c,
            _ => Color::palette(config.agent_count as usize),
        };
        let policy = MovePolicy::from_config(&config);
        let coordinator = Coordinator::new(config.initial_think_micros, config.min_think_micros);

        let mut travelers = Vec::with_capacity(config.agent_count as usize);
        let mut tasks = Vec::with_capacity(config.agent_count as usize);
        for i in 0..config.agent_count {
            let id = AgentId(i);
            let (head, facing) = match starts.get(i as usize) {
                Some(&start) => start,
                None => (layout::random_free_cell(&world, &mut rng, "a traveler")?, rng.direction()),
            };
            let body = layout::place_body(&world, id, head, facing, config.initial_segments)?;
            let color = palette[i as usize % palette.len()];

            let traveler = Arc::new(Traveler::new(id, color, body));
            tasks.push(TravelerTask::new(
                Arc::clone(&traveler),
                AgentRng::new(config.seed, id),
                policy,
            ));
            travelers.push(traveler);
            coordinator.agent_created();
        }

        info!(
            rows = config.rows,
            cols = config.cols,
            travelers = config.agent_count,
            partitions = world.partitions.len(),
            exit = ?world.exit(),
            "simulation built"
        );

        let shared = Shared {
            world,
            travelers,
            coordinator,
            started_at: OnceLock::new(),
        };
        Ok(Sim::new(shared, tasks, config.max_iterations, self.stack_size))
    }
}
