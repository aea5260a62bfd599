use crate::adapters::http::HttpSource;
use crate::core::clean::clean_data;
use crate::core::load::load_data;
use crate::core::quality::check_for_duplicates;
use crate::core::retrieve::retrieve_data;
use crate::core::transform::transform_data;
use crate::core::{ConfigProvider, Pipeline, StageOutput, Storage};
use crate::utils::error::Result;

/// The loan portfolio pipeline: every stage reads its input from and writes its
/// output to the handoff locations named by the config.
pub struct LoanPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    http: HttpSource,
}

impl<S: Storage, C: ConfigProvider> LoanPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            http: HttpSource::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.config.pipeline_name()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LoanPipeline<S, C> {
    async fn retrieve(&self) -> Result<StageOutput> {
        retrieve_data(
            &self.storage,
            &self.http,
            self.config.source_path(),
            self.config.raw_path(),
        )
        .await
    }

    async fn clean(&self) -> Result<StageOutput> {
        clean_data(&self.storage, self.config.raw_path(), self.config.cleaned_path()).await
    }

    async fn transform(&self) -> Result<StageOutput> {
        transform_data(
            &self.storage,
            self.config.cleaned_path(),
            self.config.customer_path(),
            self.config.loan_path(),
        )
        .await
    }

    async fn load(&self) -> Result<StageOutput> {
        load_data(
            &self.storage,
            self.config.customer_path(),
            self.config.loan_path(),
            self.config.final_customer_path(),
            self.config.final_loan_path(),
        )
        .await
    }

    async fn check_quality(&self) -> Result<StageOutput> {
        check_for_duplicates(&self.storage, self.config.final_loan_path()).await
    }
}
