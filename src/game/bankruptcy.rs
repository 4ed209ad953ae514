use super::board::square;
use super::engine::TurnEvent;
use super::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liquidation {
    /// Cash is back at zero or above.
    Resolved,
    /// Everything was sold and cash is still negative.
    Exhausted,
}

/// Raise cash for `player` until it is non-negative.
///
/// Houses go first, at half their cost, one square at a time in board order.
/// If that is not enough, house-free squares are returned to the bank for
/// half their price in the same order. Each sale is appended to `events`.
pub fn liquidate(state: &mut GameState, player: usize, events: &mut Vec<TurnEvent>) -> Liquidation {
    let owned: Vec<usize> = state.owned_squares(player).collect();

    for &index in &owned {
        if state.player(player).cash >= 0 {
            return Liquidation::Resolved;
        }
        let houses = state.holding(index).houses;
        if houses == 0 {
            continue;
        }
        let proceeds = (square(index).house_cost / 2) * i64::from(houses);
        state.holding_mut(index).houses = 0;
        state.player_mut(player).cash += proceeds;
        events.push(TurnEvent::SoldHouses {
            square: index,
            count: houses,
            proceeds,
        });
    }

    for &index in &owned {
        if state.player(player).cash >= 0 {
            return Liquidation::Resolved;
        }
        if state.holding(index).houses > 0 {
            continue;
        }
        let proceeds = square(index).price / 2;
        state.holding_mut(index).owner = None;
        state.player_mut(player).cash += proceeds;
        events.push(TurnEvent::SoldProperty {
            square: index,
            proceeds,
        });
    }

    if state.player(player).cash >= 0 {
        Liquidation::Resolved
    } else {
        Liquidation::Exhausted
    }
}
