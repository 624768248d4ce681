//! Run-until-player loop over the turn schedule.

use super::*;

impl Game {
    /// Dispatches up to `max_steps` schedule buckets, stopping early when the player is due,
    /// the run has finished or nothing is left to schedule.
    pub fn advance(&mut self, max_steps: u32) -> AdvanceResult {
        let start = self.schedule.now();
        let mut turns_taken = 0;
        if let Some(outcome) = self.world.outcome {
            return self.stopped(start, turns_taken, AdvanceStopReason::Finished(outcome));
        }
        if self.awaiting_player {
            return self.stopped(start, turns_taken, AdvanceStopReason::PlayerTurn);
        }

        let mut steps = 0;
        while steps < max_steps {
            let Self { world, dice, schedule, .. } = self;
            let player = world.player_id;
            let report = schedule.advance(|id| {
                if world.outcome.is_some() {
                    return TurnResult::Yield;
                }
                let Some(actor) = world.actors.get(id) else {
                    return TurnResult::Done;
                };
                if !actor.is_alive() {
                    return TurnResult::Done;
                }
                if Some(id) == player {
                    return TurnResult::Yield;
                }
                if actor.ai.is_none() {
                    return TurnResult::Done;
                }
                let cost = ai::take_turn(world, &mut *dice, id);
                world.recompute_combat_cache();
                TurnResult::Reschedule(cost)
            });
            let Some(report) = report else {
                return self.stopped(start, turns_taken, AdvanceStopReason::Idle);
            };
            steps += 1;
            turns_taken += report.processed;

            if let Some(outcome) = self.world.outcome {
                return self.stopped(start, turns_taken, AdvanceStopReason::Finished(outcome));
            }
            if report.yielded {
                self.awaiting_player = true;
                self.refresh_player_fov();
                return self.stopped(start, turns_taken, AdvanceStopReason::PlayerTurn);
            }
        }
        self.stopped(start, turns_taken, AdvanceStopReason::BudgetExhausted)
    }

    fn stopped(
        &self,
        start: u64,
        turns_taken: u32,
        stop_reason: AdvanceStopReason,
    ) -> AdvanceResult {
        let simulated_ticks = self.schedule.now().saturating_sub(start);
        tracing::debug!(simulated_ticks, turns_taken, ?stop_reason, "advance stopped");
        AdvanceResult { simulated_ticks, turns_taken, stop_reason }
    }
}
