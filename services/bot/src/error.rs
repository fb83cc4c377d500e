/// Bot process error variants.
///
/// There is no programmatic consumer at this boundary (failures become plain
/// chat replies), so the enum only distinguishes what the handlers need to
/// log.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("storage error")]
    Storage(#[from] anyhow::Error),
}
