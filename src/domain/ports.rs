use crate::domain::model::{Stage, StageOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Handoff locations between stages.
pub trait ConfigProvider: Send + Sync {
    fn pipeline_name(&self) -> &str;
    fn source_path(&self) -> &str;
    fn raw_path(&self) -> &str;
    fn cleaned_path(&self) -> &str;
    fn customer_path(&self) -> &str;
    fn loan_path(&self) -> &str;
    fn final_customer_path(&self) -> &str;
    fn final_loan_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn retrieve(&self) -> Result<StageOutput>;
    async fn clean(&self) -> Result<StageOutput>;
    async fn transform(&self) -> Result<StageOutput>;
    async fn load(&self) -> Result<StageOutput>;
    async fn check_quality(&self) -> Result<StageOutput>;

    async fn run_stage(&self, stage: Stage) -> Result<StageOutput> {
        match stage {
            Stage::Retrieve => self.retrieve().await,
            Stage::Clean => self.clean().await,
            Stage::Transform => self.transform().await,
            Stage::Load => self.load().await,
            Stage::QualityCheck => self.check_quality().await,
        }
    }
}
