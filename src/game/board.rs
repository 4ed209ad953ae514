pub const BOARD_SIZE: usize = 40;

pub const GO_SQUARE: usize = 0;
pub const JAIL_SQUARE: usize = 10;
pub const GO_TO_JAIL_SQUARE: usize = 30;

/// Flat fee to leave jail once the turn limit is reached.
pub const JAIL_FEE: i64 = 50;
/// Jail turns after which the player is forced out.
pub const JAIL_TURN_LIMIT: u8 = 3;
/// Subtracted from the step reward when a player cannot be made solvent.
pub const BANKRUPTCY_PENALTY: f64 = 1000.0;
/// Highest house count; 5 means a hotel.
pub const MAX_HOUSES: u8 = 5;
pub const MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SquareKind {
    Go,
    Property,
    Railroad,
    Utility,
    Tax,
    Chance,
    Chest,
    Jail,
    FreeParking,
    GoToJail,
}

impl SquareKind {
    /// Whether a player can own a square of this kind.
    pub fn is_ownable(self) -> bool {
        matches!(
            self,
            SquareKind::Property | SquareKind::Railroad | SquareKind::Utility
        )
    }
}

/// Static data for one square. Tax squares keep their fee in `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub name: &'static str,
    pub kind: SquareKind,
    pub price: i64,
    pub base_rent: i64,
    pub house_cost: i64,
}

impl Square {
    const fn street(name: &'static str, price: i64, base_rent: i64, house_cost: i64) -> Square {
        Square {
            name,
            kind: SquareKind::Property,
            price,
            base_rent,
            house_cost,
        }
    }

    const fn railroad(name: &'static str) -> Square {
        Square {
            name,
            kind: SquareKind::Railroad,
            price: 200,
            base_rent: 25,
            house_cost: 100,
        }
    }

    const fn utility(name: &'static str) -> Square {
        Square {
            name,
            kind: SquareKind::Utility,
            price: 150,
            base_rent: 10,
            house_cost: 75,
        }
    }

    const fn tax(name: &'static str, fee: i64) -> Square {
        Square {
            name,
            kind: SquareKind::Tax,
            price: fee,
            base_rent: 0,
            house_cost: 0,
        }
    }

    const fn special(name: &'static str, kind: SquareKind) -> Square {
        Square {
            name,
            kind,
            price: 0,
            base_rent: 0,
            house_cost: 0,
        }
    }

    /// Any ownable square with a house cost can be built on, railroads and
    /// utilities included.
    pub fn supports_houses(&self) -> bool {
        self.kind.is_ownable() && self.house_cost > 0
    }

    /// Flat fee charged on a tax square, 0 everywhere else.
    pub fn tax_fee(&self) -> i64 {
        if self.kind == SquareKind::Tax {
            self.price
        } else {
            0
        }
    }
}

/// The fixed 40-square board, indexed by position.
pub static BOARD: [Square; BOARD_SIZE] = [
    Square::special("GO", SquareKind::Go),
    Square::street("Mediterranean Avenue", 60, 2, 50),
    Square::special("Community Chest", SquareKind::Chest),
    Square::street("Baltic Avenue", 60, 4, 50),
    Square::tax("Income Tax", 200),
    Square::railroad("Reading Railroad"),
    Square::street("Oriental Avenue", 100, 6, 50),
    Square::special("Chance", SquareKind::Chance),
    Square::street("Vermont Avenue", 100, 6, 50),
    Square::street("Connecticut Avenue", 120, 8, 50),
    Square::special("Jail/Just Visiting", SquareKind::Jail),
    Square::street("St. Charles Place", 140, 10, 100),
    Square::utility("Electric Company"),
    Square::street("States Avenue", 140, 10, 100),
    Square::street("Virginia Avenue", 160, 12, 100),
    Square::railroad("Pennsylvania Railroad"),
    Square::street("St. James Place", 180, 14, 100),
    Square::special("Community Chest", SquareKind::Chest),
    Square::street("Tennessee Avenue", 180, 14, 100),
    Square::street("New York Avenue", 200, 16, 100),
    Square::special("Free Parking", SquareKind::FreeParking),
    Square::street("Kentucky Avenue", 220, 18, 150),
    Square::special("Chance", SquareKind::Chance),
    Square::street("Indiana Avenue", 220, 18, 150),
    Square::street("Illinois Avenue", 240, 20, 150),
    Square::railroad("B. & O. Railroad"),
    Square::street("Atlantic Avenue", 260, 22, 150),
    Square::street("Ventnor Avenue", 260, 22, 150),
    Square::utility("Water Works"),
    Square::street("Marvin Gardens", 280, 24, 150),
    Square::special("Go To Jail", SquareKind::GoToJail),
    Square::street("Pacific Avenue", 300, 26, 200),
    Square::street("North Carolina Avenue", 300, 26, 200),
    Square::special("Community Chest", SquareKind::Chest),
    Square::street("Pennsylvania Avenue", 320, 28, 200),
    Square::railroad("Short Line Railroad"),
    Square::special("Chance", SquareKind::Chance),
    Square::street("Park Place", 350, 35, 200),
    Square::tax("Luxury Tax", 100),
    Square::street("Boardwalk", 400, 50, 200),
];

/// Look up a square. Panics on an out-of-range index.
pub fn square(index: usize) -> &'static Square {
    assert!(index < BOARD_SIZE, "square index {index} out of range");
    &BOARD[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_squares() {
        assert_eq!(square(GO_SQUARE).kind, SquareKind::Go);
        assert_eq!(square(JAIL_SQUARE).kind, SquareKind::Jail);
        assert_eq!(square(GO_TO_JAIL_SQUARE).kind, SquareKind::GoToJail);
        assert_eq!(square(20).kind, SquareKind::FreeParking);
    }

    #[test]
    fn test_card_squares() {
        for i in [7, 22, 36] {
            assert_eq!(square(i).kind, SquareKind::Chance);
        }
        for i in [2, 17, 33] {
            assert_eq!(square(i).kind, SquareKind::Chest);
        }
    }

    #[test]
    fn test_tax_squares_have_distinct_fees() {
        assert_eq!(square(4).tax_fee(), 200);
        assert_eq!(square(38).tax_fee(), 100);
        assert_eq!(square(1).tax_fee(), 0);
    }

    #[test]
    fn test_ownable_counts() {
        let streets = BOARD.iter().filter(|s| s.kind == SquareKind::Property).count();
        let railroads = BOARD.iter().filter(|s| s.kind == SquareKind::Railroad).count();
        let utilities = BOARD.iter().filter(|s| s.kind == SquareKind::Utility).count();
        assert_eq!(streets, 22);
        assert_eq!(railroads, 4);
        assert_eq!(utilities, 2);
    }

    #[test]
    fn test_every_ownable_square_takes_houses() {
        for sq in BOARD.iter() {
            assert_eq!(sq.supports_houses(), sq.kind.is_ownable(), "{}", sq.name);
        }
        assert_eq!(square(5).house_cost, 100);
        assert_eq!(square(12).house_cost, 75);
        assert_eq!(square(28).house_cost, 75);
    }

    #[test]
    fn test_every_ownable_square_has_a_price() {
        for sq in BOARD.iter().filter(|s| s.kind.is_ownable()) {
            assert!(sq.price > 0 && sq.base_rent > 0, "{}", sq.name);
        }
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_square_panics() {
        square(BOARD_SIZE);
    }
}
