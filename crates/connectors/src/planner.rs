use crate::error::PlanningError;
use async_trait::async_trait;
use model::{read::config::ReadConfiguration, split::descriptor::SplitDescriptor};

/// Turns a read configuration and a desired parallelism into an ordered
/// list of disjoint splits. Runs once per read, at job-graph
/// construction time.
#[async_trait]
pub trait SplitPlanner: Send + Sync {
    /// Parallelism is advisory: a planner may return fewer or more
    /// splits than requested. Zero splits is a valid plan (empty
    /// entity), not an error.
    async fn plan(
        &self,
        config: &ReadConfiguration,
        desired_parallelism: usize,
    ) -> Result<Vec<SplitDescriptor>, PlanningError>;
}
