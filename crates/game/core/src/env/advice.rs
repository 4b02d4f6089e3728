use crate::state::{Direction, LevelId, Position};

/// Pathfinding service consumed by decision providers.
///
/// The core never builds cost maps itself; it only asks for the next step.
pub trait MovementAdvice: Send + Sync {
    /// First step of a route from `from` toward `to`, or `None` when no route exists.
    fn step_toward(&self, level: LevelId, from: Position, to: Position) -> Option<Direction>;
}

/// Walks straight at the target, ignoring obstacles.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectAdvice;

impl MovementAdvice for DirectAdvice {
    fn step_toward(&self, _level: LevelId, from: Position, to: Position) -> Option<Direction> {
        let (dx, dy) = from.heading(to);
        Direction::from_delta(dx, dy)
    }
}
