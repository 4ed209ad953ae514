//! Turn resolution: one call to [`step`] plays one turn for the current
//! player and reports what happened.

use super::action::Action;
use super::bankruptcy::{liquidate, Liquidation};
use super::board::{
    square, SquareKind, BANKRUPTCY_PENALTY, BOARD_SIZE, JAIL_FEE, JAIL_SQUARE, JAIL_TURN_LIMIT,
    MAX_HOUSES,
};
use super::cards::{CardDeck, DeckKind, CHANCE, COMMUNITY_CHEST};
use super::dice::{DiceRoll, DiceSource};
use super::rent::rent;
use super::state::GameState;

/// Something that happened during a turn, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    StayedInJail { jail_turns: u8 },
    LeftJailByDoubles,
    LeftJailByFee { fee: i64 },
    PassedGo { credit: i64 },
    DrewCard { deck: DeckKind, name: &'static str },
    SentToJail,
    PaidTax { square: usize, amount: i64 },
    BoughtProperty { square: usize, price: i64 },
    DeclinedProperty { square: usize },
    CannotAffordProperty { square: usize, price: i64 },
    PaidRent { square: usize, owner: usize, due: i64, paid: i64 },
    BoughtHouse { square: usize, houses: u8, cost: i64 },
    DeclinedHouse { square: usize },
    HousesMaxed { square: usize },
    CannotAffordHouse { square: usize, cost: i64 },
    SoldHouses { square: usize, count: u8, proceeds: i64 },
    SoldProperty { square: usize, proceeds: i64 },
    Bankrupt { final_cash: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CardDraw {
    pub deck: DeckKind,
    pub name: &'static str,
    pub effect_text: String,
}

/// Everything needed to reconstruct a turn without replaying it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StepLog {
    pub step: usize,
    pub player: usize,
    pub position_before: usize,
    pub dice: DiceRoll,
    pub dice_total: usize,
    /// Square reached by the dice, before any card moved the player.
    pub landed_on: usize,
    pub position_after: usize,
    pub cash_before: i64,
    pub cash_after: i64,
    pub reward: f64,
    /// Jail fee, tax and rent paid this turn.
    pub fee_paid: i64,
    pub action: Action,
    pub in_jail: bool,
    pub done: bool,
    pub properties_owned: usize,
    pub card: Option<CardDraw>,
    pub events: Vec<TurnEvent>,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub reward: f64,
    pub done: bool,
    pub log: StepLog,
}

/// Money movements and notes collected while a turn resolves.
#[derive(Default)]
struct TurnLedger {
    cash_delta: i64,
    fee_paid: i64,
    card: Option<CardDraw>,
    events: Vec<TurnEvent>,
}

/// Whether `player` faces a real buy/pass choice on the square they occupy.
///
/// True for an unowned ownable square they can afford, or for their own
/// street when it has room for another house they can afford.
pub fn decision_available(state: &GameState, player: usize) -> bool {
    let p = state.player(player);
    if p.in_jail {
        return false;
    }
    let sq = square(p.position);
    if !sq.kind.is_ownable() {
        return false;
    }
    let holding = state.holding(p.position);
    match holding.owner {
        None => p.cash >= sq.price,
        Some(owner) if owner == player => {
            sq.supports_houses() && holding.houses < MAX_HOUSES && p.cash >= sq.house_cost
        }
        Some(_) => false,
    }
}

/// Play one turn for the current player with the given decision.
///
/// Panics if the game is already over.
pub fn step<D: DiceSource + ?Sized>(state: &mut GameState, action: Action, dice: &mut D) -> StepResult {
    assert!(!state.is_terminal(), "step called on a finished game");

    let p = state.current_player();
    let step_index = state.step_count();
    let position_before = state.player(p).position;
    let cash_before = state.player(p).cash;
    let mut ledger = TurnLedger::default();

    let roll = dice.roll_dice();

    let moves = if state.player(p).in_jail {
        resolve_jail(state, p, roll, &mut ledger)
    } else {
        true
    };

    let landed_on = if moves {
        let landed_on = advance(state, p, roll, &mut ledger);
        let card_jailed = draw_card(state, p, dice, &mut ledger);
        resolve_square(state, p, action, card_jailed, &mut ledger);
        landed_on
    } else {
        position_before
    };

    let mut reward = ledger.cash_delta as f64;
    if state.player(p).cash < 0 && liquidate(state, p, &mut ledger.events) == Liquidation::Exhausted {
        ledger.events.push(TurnEvent::Bankrupt {
            final_cash: state.player(p).cash,
        });
        state.declare_bankrupt(p);
        reward -= BANKRUPTCY_PENALTY;
    }

    state.count_step();
    let done = state.is_terminal();
    if !done {
        state.advance_turn();
    }

    let player = state.player(p);
    let log = StepLog {
        step: step_index,
        player: p,
        position_before,
        dice: roll,
        dice_total: roll.total(),
        landed_on,
        position_after: player.position,
        cash_before,
        cash_after: player.cash,
        reward,
        fee_paid: ledger.fee_paid,
        action,
        in_jail: player.in_jail,
        done,
        properties_owned: state.owned_count(p),
        card: ledger.card,
        events: ledger.events,
    };
    StepResult { reward, done, log }
}

/// Count a jail turn. Returns whether the player gets to move with `roll`.
fn resolve_jail(state: &mut GameState, p: usize, roll: DiceRoll, ledger: &mut TurnLedger) -> bool {
    let player = state.player_mut(p);
    player.jail_turns += 1;
    if roll.is_double() {
        player.release_from_jail();
        ledger.events.push(TurnEvent::LeftJailByDoubles);
        true
    } else if player.jail_turns >= JAIL_TURN_LIMIT {
        player.release_from_jail();
        player.cash -= JAIL_FEE;
        ledger.cash_delta -= JAIL_FEE;
        ledger.fee_paid += JAIL_FEE;
        ledger.events.push(TurnEvent::LeftJailByFee { fee: JAIL_FEE });
        true
    } else {
        ledger.events.push(TurnEvent::StayedInJail {
            jail_turns: player.jail_turns,
        });
        false
    }
}

/// Move by the dice total, crediting GO on a wrap. Returns the landing square.
fn advance(state: &mut GameState, p: usize, roll: DiceRoll, ledger: &mut TurnLedger) -> usize {
    let credit = state.config().pass_go_credit;
    let player = state.player_mut(p);
    let old = player.position;
    let new = (old + roll.total()) % BOARD_SIZE;
    player.move_to(new);
    // A move starting on the jail square never credits GO.
    if new < old && old != JAIL_SQUARE {
        player.cash += credit;
        ledger.cash_delta += credit;
        ledger.events.push(TurnEvent::PassedGo { credit });
    }
    new
}

/// Draw and apply a card if the player stands on Chance or Community Chest.
/// Returns whether the card sent them to jail.
fn draw_card<D: DiceSource + ?Sized>(
    state: &mut GameState,
    p: usize,
    dice: &mut D,
    ledger: &mut TurnLedger,
) -> bool {
    let deck: &CardDeck = match square(state.player(p).position).kind {
        SquareKind::Chance => &CHANCE,
        SquareKind::Chest => &COMMUNITY_CHEST,
        _ => return false,
    };
    let card = deck.draw(dice);
    let credit = state.config().pass_go_credit;
    let resolution = card.effect.apply(state.player_mut(p), credit);

    ledger.cash_delta += resolution.cash_delta;
    ledger.events.push(TurnEvent::DrewCard {
        deck: deck.kind,
        name: card.name,
    });
    if resolution.sent_to_jail {
        ledger.events.push(TurnEvent::SentToJail);
    }
    ledger.card = Some(CardDraw {
        deck: deck.kind,
        name: card.name,
        effect_text: resolution.text,
    });
    resolution.sent_to_jail
}

/// Apply the rules of the square the player ends up on after any card.
fn resolve_square(
    state: &mut GameState,
    p: usize,
    action: Action,
    card_jailed: bool,
    ledger: &mut TurnLedger,
) {
    let position = state.player(p).position;
    let sq = square(position);
    match sq.kind {
        SquareKind::GoToJail if !card_jailed => {
            state.player_mut(p).send_to_jail();
            ledger.events.push(TurnEvent::SentToJail);
        }
        SquareKind::Tax => {
            let amount = sq.tax_fee();
            state.player_mut(p).cash -= amount;
            ledger.cash_delta -= amount;
            ledger.fee_paid += amount;
            ledger.events.push(TurnEvent::PaidTax {
                square: position,
                amount,
            });
        }
        kind if kind.is_ownable() => resolve_ownable(state, p, position, action, ledger),
        _ => {}
    }
}

fn resolve_ownable(
    state: &mut GameState,
    p: usize,
    position: usize,
    action: Action,
    ledger: &mut TurnLedger,
) {
    let sq = square(position);
    let holding = state.holding(position);
    let cash = state.player(p).cash;

    match holding.owner {
        None if cash < sq.price => {
            ledger.events.push(TurnEvent::CannotAffordProperty {
                square: position,
                price: sq.price,
            });
        }
        None => match action {
            Action::Buy => {
                state.player_mut(p).cash -= sq.price;
                let h = state.holding_mut(position);
                h.owner = Some(p);
                h.houses = 0;
                ledger.events.push(TurnEvent::BoughtProperty {
                    square: position,
                    price: sq.price,
                });
            }
            Action::Pass => ledger.events.push(TurnEvent::DeclinedProperty { square: position }),
        },
        Some(owner) if owner != p => {
            let due = rent(sq.base_rent, holding.houses);
            // Cash left negative by a jail fee makes the payment negative,
            // which brings the payer back to zero.
            let paid = due.min(cash);
            state.player_mut(p).cash -= paid;
            state.player_mut(owner).cash += paid;
            ledger.cash_delta -= paid;
            ledger.fee_paid += paid;
            ledger.events.push(TurnEvent::PaidRent {
                square: position,
                owner,
                due,
                paid,
            });
        }
        Some(_) => {
            if !sq.supports_houses() {
                return;
            }
            if holding.houses >= MAX_HOUSES {
                ledger.events.push(TurnEvent::HousesMaxed { square: position });
                return;
            }
            if cash < sq.house_cost {
                ledger.events.push(TurnEvent::CannotAffordHouse {
                    square: position,
                    cost: sq.house_cost,
                });
                return;
            }
            match action {
                Action::Buy => {
                    state.player_mut(p).cash -= sq.house_cost;
                    let h = state.holding_mut(position);
                    h.houses += 1;
                    ledger.cash_delta -= sq.house_cost;
                    ledger.events.push(TurnEvent::BoughtHouse {
                        square: position,
                        houses: h.houses,
                        cost: sq.house_cost,
                    });
                }
                Action::Pass => ledger.events.push(TurnEvent::DeclinedHouse { square: position }),
            }
        }
    }
}
