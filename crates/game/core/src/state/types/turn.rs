use super::EntityId;

/// Scheduler bookkeeping: the turn counter and the LIFO pool of admitted actors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Completed End-of-Round sweeps. Only the driver advances it.
    pub turn: u64,

    /// Actors admitted to act this round. The last element acts next.
    pub pool: Vec<EntityId>,

    /// The actor whose action the driver is currently waiting for.
    pub current_actor: Option<EntityId>,

    /// Sequential action identifier, mixed into every RNG seed.
    pub nonce: u64,

    /// Consecutive End-of-Round sweeps that admitted nobody.
    #[cfg_attr(feature = "serde", serde(default))]
    pub idle_rounds: u32,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an actor onto the pool unless it is already queued.
    pub fn admit(&mut self, actor: EntityId) -> bool {
        if self.pool.contains(&actor) {
            return false;
        }
        self.pool.push(actor);
        true
    }

    /// Pops the most recently admitted actor.
    pub fn pop(&mut self) -> Option<EntityId> {
        self.pool.pop()
    }

    pub fn dequeue(&mut self, actor: EntityId) {
        self.pool.retain(|queued| *queued != actor);
        if self.current_actor == Some(actor) {
            self.current_actor = None;
        }
    }
}
