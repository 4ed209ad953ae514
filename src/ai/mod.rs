mod agent;
pub mod monte_carlo;
mod random;
pub mod state_key;
pub mod value_store;

pub use agent::Policy;
pub use monte_carlo::{first_visit_update, MonteCarloAgent, TrajectoryStep, UpdateStats};
pub use random::RandomAgent;
pub use state_key::{abstract_state, StateKey};
pub use value_store::{ActionValueRecord, StateValues, ValueEntry, ValueStore};
