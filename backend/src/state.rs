use std::sync::Arc;

use crate::{
    config::Config,
    services::{AuthService, ExpenseService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub expenses: Arc<ExpenseService>,
}

impl AppState {
    pub fn new(config: Config, auth: AuthService, expenses: ExpenseService) -> Self {
        Self {
            config,
            auth: Arc::new(auth),
            expenses: Arc::new(expenses),
        }
    }
}
