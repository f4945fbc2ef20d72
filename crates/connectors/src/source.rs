use crate::{cursor::RecordCursor, error::OpenError, planner::SplitPlanner};
use async_trait::async_trait;
use model::{read::config::ReadConfiguration, split::descriptor::SplitDescriptor};

/// Backend strategy object: split planning plus cursor construction for
/// one backend shape. Selected at planning time and carried alongside
/// the descriptors; the runtime is generic over it and never branches
/// on backend identity itself.
#[async_trait]
pub trait SplitSource: SplitPlanner {
    /// Opens a cursor over one assigned split. Fails on auth/connection
    /// errors and on descriptors whose payload kind belongs to a
    /// different strategy.
    async fn open(
        &self,
        config: &ReadConfiguration,
        split: &SplitDescriptor,
    ) -> Result<Box<dyn RecordCursor>, OpenError>;
}
