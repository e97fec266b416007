//! Business logic layer

pub mod catalog;
pub mod loans;
pub mod policy;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

use catalog::CatalogService;
use loans::LoansService;
use policy::{DefaultReturnPolicy, ReturnPolicy};
use stats::StatsService;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub loans: LoansService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let policy: Arc<dyn ReturnPolicy> =
            Arc::new(DefaultReturnPolicy::new(config.loans.clone()));

        Self {
            catalog: CatalogService::new(repository.clone()),
            loans: LoansService::new(repository.clone(), policy, config.loans.clone()),
            stats: StatsService::new(repository),
        }
    }
}
