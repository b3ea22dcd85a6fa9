// Next-season projection: readiness, role, workload, aging, model blending.

pub mod aging;
pub mod ensemble;
pub mod readiness;
pub mod role;
pub mod workload;

use thiserror::Error;

use crate::stats::season::PlayerId;

/// A single pitcher's projection failed. The batch drops the pitcher and
/// carries on.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("player {player_id}: {what} is not finite")]
    NonFinite { player_id: PlayerId, what: &'static str },

    #[error("player {0} is not on the roster")]
    NotRostered(PlayerId),
}
