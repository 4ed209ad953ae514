/// The binary decision offered on every step.
///
/// `Buy` means "buy this property" on an unowned square and "buy one house"
/// on a street the player already owns. Both decisions share one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Action {
    Pass,
    Buy,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Pass, Action::Buy];

    /// Index into per-action arrays (Pass = 0, Buy = 1).
    pub fn index(self) -> usize {
        match self {
            Action::Pass => 0,
            Action::Buy => 1,
        }
    }

    pub fn from_index(index: usize) -> Action {
        match index {
            0 => Action::Pass,
            1 => Action::Buy,
            _ => panic!("action index {index} out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_mapping() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), action);
        }
        assert_eq!(Action::Pass.index(), 0);
        assert_eq!(Action::Buy.index(), 1);
    }

    #[test]
    #[should_panic]
    fn test_bad_index_panics() {
        Action::from_index(2);
    }
}
