use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{RateProvider, ResultEngine, StaticRates};

mod access;
mod approvals;
mod categories;
mod chain;
mod companies;
mod expenses;
mod users;
mod workflows;

pub use approvals::{DecisionRecord, PendingApproval};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    rates: Arc<dyn RateProvider>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Rate provider used to normalize submitted amounts.
    pub fn rates(&self) -> &dyn RateProvider {
        self.rates.as_ref()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    rates: Option<Arc<dyn RateProvider>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Exchange rates; defaults to [`StaticRates::default`].
    pub fn rates(mut self, rates: impl RateProvider + 'static) -> EngineBuilder {
        self.rates = Some(Arc::new(rates));
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            rates: self
                .rates
                .unwrap_or_else(|| Arc::new(StaticRates::default())),
        })
    }
}
