use crate::types::Round;

/// Failures surfaced to callers. Per-pair pick drops (locked game, unmet
/// dependency) are not errors; they are reported in the submission outcome
/// list instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no game in the contest matches template declaration {round} position {position}")]
    TemplateMismatch { round: Round, position: u32 },
    #[error("game {game_id} already has a recorded winner; use correction mode to change it")]
    AlreadyFinal { game_id: u64 },
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: u64 },
    #[error("not a recognized slot value: {0:?}")]
    InvalidSlot(String),
}
