use profrag::{Advisor, Config};
use std::sync::Arc;

pub struct State {
    pub advisor: Advisor,
}

#[allow(clippy::module_name_repetitions)]
pub type AppState = Arc<State>;

pub fn create(config: &Config) -> AppState {
    with_advisor(Advisor::connect(config))
}

pub fn with_advisor(advisor: Advisor) -> AppState {
    Arc::new(State { advisor })
}
