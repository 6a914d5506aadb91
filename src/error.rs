/// Error returned when calling a function container fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CallError {
    /// Container holds no callable.
    #[error("called an empty function container")]
    Empty,
}
