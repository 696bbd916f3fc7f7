//! Victim selection for under-threshold rounds.

use tracing::debug;

use crate::state::game::Team;
use crate::state::rng::GameRng;

/// Mark up to `count` members of the team eliminated, returning their
/// names in pick order.
///
/// Each pick draws uniformly from the members still active at that point,
/// so no member can be picked twice in one invocation. The active set is
/// never reduced below one: a pool of exactly one member is left untouched
/// regardless of `count`.
pub fn eliminate(team: &mut Team, count: u32, rng: &mut GameRng) -> Vec<String> {
    let mut victims = Vec::new();

    for _ in 0..count {
        let active: Vec<usize> = team
            .members
            .iter()
            .enumerate()
            .filter(|(_, member)| !member.eliminated)
            .map(|(index, _)| index)
            .collect();

        if active.len() <= 1 {
            break;
        }

        let Some(pick) = rng.pick(active.len()) else {
            break;
        };
        let member = &mut team.members[active[pick]];
        member.eliminated = true;
        debug!(team = %team.name, member = %member.name, "member eliminated");
        victims.push(member.name.clone());
    }

    victims
}
