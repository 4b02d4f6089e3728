//! Turn scheduling and the simulation driver.
//!
//! The [`GameEngine`] is the only component that advances the turn counter or
//! runs the End-of-Round sweep. One tick is:
//!
//! 1. [`GameEngine::next_actor`] pops the most recently admitted actor,
//!    sweeping and refreshing the pool as often as needed.
//! 2. The actor's decision provider returns an [`Action`] (the player's comes
//!    from outside, so the loop suspends on it).
//! 3. [`GameEngine::execute`] resolves it and charges its energy cost.
//!
//! [`GameEngine::step`] runs one whole tick.

mod errors;
mod round;

pub use errors::{ExecuteError, Termination};

use crate::action::{self, Action, ActionKind, ActionResult};
use crate::context::ResolveContext;
use crate::env::GameEnv;
use crate::provider::ActionProvider;
use crate::state::{EntityId, GameState};
use crate::traits::TraitKind;

/// What one call to [`GameEngine::step`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// An NPC acted.
    Acted {
        actor: EntityId,
        result: ActionResult,
    },
    /// The player is up; submit its action through [`GameEngine::execute`].
    AwaitingInput(EntityId),
    /// Every sweep in the idle budget admitted nobody.
    Idle,
}

pub struct GameEngine<'a> {
    state: &'a mut GameState,
    /// Messages from End-of-Round sweeps not yet collected.
    journal: Vec<String>,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self {
            state,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Drains the messages produced by End-of-Round sweeps so far.
    pub fn take_journal(&mut self) -> Vec<String> {
        std::mem::take(&mut self.journal)
    }

    /// The actor whose action the engine is waiting for.
    pub fn current_actor(&self) -> Option<EntityId> {
        self.state.turn.current_actor
    }

    // ===== scheduler =====

    /// Adds `max(0, recovery)` to every actor on the active level and admits
    /// those at or above the action threshold: NPCs in ascending id order,
    /// then the player, who therefore pops first.
    /// Returns how many were newly admitted.
    pub fn refresh_pool(&mut self, env: &GameEnv<'_>) -> usize {
        let threshold = env.config().action_threshold;
        let mut ids = self.state.active_actor_ids();
        if let Some(index) = ids.iter().position(|id| id.is_player()) {
            let player = ids.remove(index);
            ids.push(player);
        }
        let mut admitted = 0;
        for id in ids {
            let Some(actor) = self.state.entities.actor_mut(id) else {
                continue;
            };
            if actor.is_removed() {
                continue;
            }
            actor.energy += actor.recovery.max(0.0);
            if actor.energy >= threshold && self.state.turn.admit(id) {
                admitted += 1;
            }
        }
        tracing::trace!(target: "delve::scheduler", admitted, pool = self.state.turn.pool.len(), "pool refreshed");
        admitted
    }

    /// Pops the next actor to act, running End-of-Round sweeps and refreshes
    /// until somebody is admitted.
    ///
    /// Returns `None` once `max_idle_rounds` consecutive sweeps admit nobody.
    pub fn next_actor(&mut self, env: &GameEnv<'_>) -> Result<Option<EntityId>, ExecuteError> {
        loop {
            while let Some(id) = self.state.turn.pop() {
                let level = self.state.world.active_level;
                let eligible = self
                    .state
                    .entities
                    .actor(id)
                    .is_some_and(|actor| !actor.is_removed() && actor.level == level);
                if eligible {
                    self.state.turn.current_actor = Some(id);
                    tracing::debug!(target: "delve::scheduler", actor = %id, "next actor");
                    return Ok(Some(id));
                }
            }

            if self.state.turn.idle_rounds >= env.config().max_idle_rounds {
                tracing::warn!(
                    target: "delve::scheduler",
                    rounds = self.state.turn.idle_rounds,
                    "no actor admitted within the idle budget"
                );
                self.state.turn.idle_rounds = 0;
                self.state.turn.current_actor = None;
                return Ok(None);
            }

            let messages = round::end_of_round(self.state, env)?;
            self.journal.extend(messages);
            if self.refresh_pool(env) == 0 {
                self.state.turn.idle_rounds += 1;
            } else {
                self.state.turn.idle_rounds = 0;
            }
        }
    }

    // ===== execution =====

    /// Resolves `action` for the current actor and charges its energy cost.
    ///
    /// A paralyzed actor only waits, whatever it asked for. An actor left at
    /// or above the action threshold goes straight back on top of the pool.
    pub fn execute(&mut self, env: &GameEnv<'_>, action: &Action) -> Result<ActionResult, ExecuteError> {
        let result = self.resolve(env, action)?;
        self.readmit(env, action.actor);
        Ok(result)
    }

    fn resolve(&mut self, env: &GameEnv<'_>, action: &Action) -> Result<ActionResult, ExecuteError> {
        self.validate_actor(action)?;
        let actor = action.actor;
        let paralyzed = self
            .state
            .entities
            .actor(actor)
            .ok_or(ExecuteError::UnknownActor(actor))?
            .has(TraitKind::Paralyzed);

        let substitute;
        let action = if paralyzed && action.kind != ActionKind::Wait {
            tracing::debug!(target: "delve::engine", %actor, "paralyzed actor waits");
            substitute = Action::wait(actor);
            &substitute
        } else {
            action
        };

        let mut ctx = ResolveContext::new(self.state, env, actor)?;
        let outcome = action::execute(&mut ctx, action);
        drop(ctx);
        self.state.turn.nonce += 1;
        let result = outcome?;

        if let Some(performer) = self.state.entities.actor_mut(actor) {
            performer.energy -= result.energy_cost;
        }
        self.state.turn.current_actor = None;
        Ok(result)
    }

    /// Gives an actor with energy to spare another action this round.
    fn readmit(&mut self, env: &GameEnv<'_>, actor: EntityId) {
        let level = self.state.world.active_level;
        let ready = self.state.entities.actor(actor).is_some_and(|performer| {
            !performer.is_removed()
                && performer.is_alive()
                && performer.level == level
                && performer.energy >= env.config().action_threshold
        });
        if ready && self.state.turn.admit(actor) {
            tracing::trace!(target: "delve::scheduler", %actor, "readmitted with energy to spare");
        }
    }

    /// Actions are only accepted from the actor the scheduler handed out.
    fn validate_actor(&self, action: &Action) -> Result<(), ExecuteError> {
        let current_actor = self.state.turn.current_actor;
        if current_actor != Some(action.actor) {
            return Err(ExecuteError::ActorNotCurrent {
                actor: action.actor,
                current_actor,
            });
        }
        Ok(())
    }

    // ===== driver =====

    /// One tick: pick the next actor and, unless it is the player, ask
    /// `provider` for its action and execute it.
    ///
    /// An NPC action that cannot be carried out is replaced by waiting.
    pub fn step(
        &mut self,
        env: &GameEnv<'_>,
        provider: &dyn ActionProvider,
    ) -> Result<StepOutcome, ExecuteError> {
        let actor = match self.state.turn.current_actor {
            Some(actor) => actor,
            None => match self.next_actor(env)? {
                Some(actor) => actor,
                None => return Ok(StepOutcome::Idle),
            },
        };
        if actor.is_player() {
            return Ok(StepOutcome::AwaitingInput(actor));
        }

        let action = provider
            .provide_action(actor, self.state, env)
            .unwrap_or_else(|| Action::wait(actor));
        let result = self.resolve(env, &action)?;
        let result = if result.complete || !self.state.entities.contains(actor) {
            result
        } else {
            self.state.turn.current_actor = Some(actor);
            let fallback = self.resolve(env, &Action::wait(actor))?;
            ActionResult {
                messages: result.messages.into_iter().chain(fallback.messages).collect(),
                ..fallback
            }
        };
        self.readmit(env, actor);
        Ok(StepOutcome::Acted { actor, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Direction, Position};
    use crate::tests::helpers::{brute, Sandbox};
    use crate::traits::{self, Trait};

    #[test]
    fn actions_from_the_wrong_actor_are_rejected() {
        let sandbox = Sandbox::open(5, 5, []);
        let mut state = sandbox.state_with([brute(1, Position::new(1, 1)), brute(2, Position::new(3, 3))]);
        state.turn.current_actor = Some(EntityId(1));
        let env = sandbox.env();
        let mut engine = GameEngine::new(&mut state);

        let error = engine
            .execute(&env, &Action::wait(EntityId(2)))
            .expect_err("not this actor's turn");
        assert_eq!(
            error,
            ExecuteError::ActorNotCurrent {
                actor: EntityId(2),
                current_actor: Some(EntityId(1)),
            }
        );
    }

    #[test]
    fn executing_charges_energy_and_bumps_the_nonce() {
        let sandbox = Sandbox::open(5, 5, []);
        let mut runner = brute(1, Position::new(1, 1));
        runner.energy = 1.5;
        let mut state = sandbox.state_with([runner]);
        state.turn.current_actor = Some(EntityId(1));
        let env = sandbox.env();
        let mut engine = GameEngine::new(&mut state);

        let result = engine
            .execute(&env, &Action::new(EntityId(1), ActionKind::Move(Direction::East)))
            .expect("executes");
        assert!(result.complete);
        drop(engine);

        assert_eq!(state.turn.nonce, 1);
        assert_eq!(state.turn.current_actor, None);
        let runner = state.entities.actor(EntityId(1)).expect("alive");
        assert_eq!(runner.energy, 0.5);
        assert_eq!(runner.position, Some(Position::new(2, 1)));
    }

    #[test]
    fn paralyzed_actors_only_wait() {
        let sandbox = Sandbox::open(5, 5, []);
        let mut state = sandbox.state_with([brute(1, Position::new(1, 1))]);
        {
            let env = sandbox.env();
            let mut ctx = ResolveContext::new(&mut state, &env, EntityId::SYSTEM).expect("context");
            traits::apply(&mut ctx, EntityId(1), Trait::Paralyzed { dc: 15 }, Some(3)).expect("alive");
        }
        state.turn.current_actor = Some(EntityId(1));
        let env = sandbox.env();
        let mut engine = GameEngine::new(&mut state);

        engine
            .execute(&env, &Action::new(EntityId(1), ActionKind::Move(Direction::East)))
            .expect("executes");
        drop(engine);
        assert_eq!(
            state.entities.actor(EntityId(1)).and_then(|a| a.position),
            Some(Position::new(1, 1))
        );
    }

    #[test]
    fn fast_actors_act_twice_as_often_without_hoarding_energy() {
        let sandbox = Sandbox::open(6, 3, []);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 1)).with_recovery(1.0),
            brute(2, Position::new(3, 1)).with_recovery(2.0),
        ]);
        let env = sandbox.env();
        let mut engine = GameEngine::new(&mut state);

        let mut actions = [0u32; 2];
        for _ in 0..30 {
            let actor = engine.next_actor(&env).expect("no error").expect("someone acts");
            let peak = engine
                .state()
                .entities
                .all_actors()
                .map(|actor| actor.energy)
                .fold(0.0, f64::max);
            assert!(peak <= 2.0, "energy piled up to {peak}");
            engine.execute(&env, &Action::wait(actor)).expect("waits");
            actions[actor.0 as usize - 1] += 1;
        }
        drop(engine);

        assert_eq!(actions, [10, 20]);
        assert_eq!(state.turn.turn, 10);
    }

    #[test]
    fn a_cheap_action_leaves_energy_for_another() {
        let sandbox = Sandbox::from_rows(&["###", "#.#", "###"], []);
        let mut runner = brute(1, Position::new(1, 1));
        runner.energy = 1.0;
        let mut state = sandbox.state_with([runner]);
        state.turn.current_actor = Some(EntityId(1));
        let env = sandbox.env();
        let mut engine = GameEngine::new(&mut state);

        // Walking into the wall costs nothing, so the actor is up again.
        let result = engine
            .execute(&env, &Action::new(EntityId(1), ActionKind::Move(Direction::North)))
            .expect("executes");
        assert!(!result.complete);
        assert_eq!(engine.state().turn.pool, vec![EntityId(1)]);
        assert_eq!(engine.next_actor(&env).expect("no error"), Some(EntityId(1)));
    }

    #[test]
    fn an_empty_level_reports_idle() {
        let mut sandbox = Sandbox::open(3, 3, []);
        sandbox.config.max_idle_rounds = 5;
        let mut state = sandbox.state_with([]);
        let env = sandbox.env();
        let mut engine = GameEngine::new(&mut state);

        assert_eq!(engine.next_actor(&env).expect("sweeps"), None);
        drop(engine);
        assert_eq!(state.turn.turn, 5);
    }
}
