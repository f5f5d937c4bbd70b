use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::ResultEngine;
use crate::lookup::{DEFAULT_LOOKUP_TTL, LookupCache};

mod auth;
mod imports;
mod lookups;
mod movements;

pub use auth::hash_password;
pub use lookups::Lookups;
pub use movements::{MovementEntry, MovementUpdate};

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
    lookups: LookupCache,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    lookup_ttl: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the reference-data cache validity window (defaults to 10
    /// minutes). Tests shrink it to observe expiry.
    pub fn lookup_ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.lookup_ttl = Some(ttl);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            lookups: LookupCache::new(self.lookup_ttl.unwrap_or(DEFAULT_LOOKUP_TTL)),
        })
    }
}
