use crate::PlayerId;

/// A pure strategy of one player in a [NormalForm](crate::NormalForm)
///
/// This is only a handle: the choice it makes at each information set is recovered from the
/// index with [NormalForm::strategy_choices](crate::NormalForm::strategy_choices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
    pub(super) nfg: u64,
    pub(super) player: PlayerId,
    pub(super) index: usize,
}

impl Strategy {
    /// The player this strategy belongs to
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// The position of this strategy among all strategies of its player
    pub fn index(&self) -> usize {
        self.index
    }

    pub(super) fn slot(&self) -> usize {
        self.player.index() - 1
    }
}
