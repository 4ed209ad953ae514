use super::board::GO_SQUARE;
use super::dice::DiceSource;
use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CardEffect {
    AdvanceToGo,
    GoToJail,
    Credit(i64),
    Debit(i64),
}

/// Result of applying a card to the player who drew it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardResolution {
    /// Cash delta, counted toward the step reward.
    pub cash_delta: i64,
    pub sent_to_jail: bool,
    pub text: String,
}

impl CardEffect {
    /// Apply this effect. Every card only touches the drawing player; the
    /// bank is the counterparty for all money.
    pub fn apply(self, player: &mut Player, pass_go_credit: i64) -> CardResolution {
        match self {
            CardEffect::AdvanceToGo => {
                let collect = player.position != GO_SQUARE;
                player.move_to(GO_SQUARE);
                if collect {
                    player.cash += pass_go_credit;
                    CardResolution {
                        cash_delta: pass_go_credit,
                        sent_to_jail: false,
                        text: format!("Advanced to GO. Collected ${pass_go_credit}."),
                    }
                } else {
                    CardResolution {
                        cash_delta: 0,
                        sent_to_jail: false,
                        text: "Advanced to GO.".to_string(),
                    }
                }
            }
            CardEffect::GoToJail => {
                player.send_to_jail();
                CardResolution {
                    cash_delta: 0,
                    sent_to_jail: true,
                    text: format!("Moved to Jail (Position {}).", player.position),
                }
            }
            CardEffect::Credit(amount) => {
                player.cash += amount;
                CardResolution {
                    cash_delta: amount,
                    sent_to_jail: false,
                    text: format!("Adjusted money by {amount}."),
                }
            }
            CardEffect::Debit(amount) => {
                player.cash -= amount;
                CardResolution {
                    cash_delta: -amount,
                    sent_to_jail: false,
                    text: format!("Adjusted money by -{amount}."),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub name: &'static str,
    pub effect: CardEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DeckKind {
    Chance,
    CommunityChest,
}

/// A fixed, ordered list of cards. Drawing picks uniformly with replacement
/// and never reorders or removes anything.
#[derive(Debug)]
pub struct CardDeck {
    pub kind: DeckKind,
    cards: &'static [Card],
}

impl CardDeck {
    pub fn cards(&self) -> &'static [Card] {
        self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn draw<D: DiceSource + ?Sized>(&self, dice: &mut D) -> &'static Card {
        &self.cards[dice.pick_card(self.cards.len())]
    }
}

pub static CHANCE: CardDeck = CardDeck {
    kind: DeckKind::Chance,
    cards: &[
        Card {
            name: "Advance to Go",
            effect: CardEffect::AdvanceToGo,
        },
        Card {
            name: "Go to Jail",
            effect: CardEffect::GoToJail,
        },
        Card {
            name: "Bank pays you dividend",
            effect: CardEffect::Credit(50),
        },
        Card {
            name: "Pay poor tax",
            effect: CardEffect::Debit(15),
        },
    ],
};

pub static COMMUNITY_CHEST: CardDeck = CardDeck {
    kind: DeckKind::CommunityChest,
    cards: &[
        Card {
            name: "Doctor's fee",
            effect: CardEffect::Debit(50),
        },
        Card {
            name: "Income tax refund",
            effect: CardEffect::Credit(20),
        },
        Card {
            name: "Go to Jail",
            effect: CardEffect::GoToJail,
        },
        Card {
            name: "Advance to Go",
            effect: CardEffect::AdvanceToGo,
        },
    ],
};
