#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("No live feed subscribers")]
    NoSubscribers,
}
