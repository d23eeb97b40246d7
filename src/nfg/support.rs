use super::Strategy;
use crate::{NormalFormError, PlayerId};

/// A subset of the strategies of each player
///
/// Created from a [NormalForm](crate::NormalForm) with every strategy included. Two supports are
/// equal when they come from the same normal form and include the same strategies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Support {
    pub(super) nfg: u64,
    pub(super) flags: Box<[Box<[bool]>]>,
}

impl Support {
    pub(super) fn full(nfg: u64, counts: &[usize]) -> Self {
        let flags = counts.iter().map(|count| vec![true; *count].into()).collect();
        Support { nfg, flags }
    }

    fn flag_mut(&mut self, strategy: Strategy) -> Result<&mut bool, NormalFormError> {
        if strategy.nfg != self.nfg {
            Err(NormalFormError::ForeignProfile)
        } else {
            Ok(&mut self.flags[strategy.slot()][strategy.index])
        }
    }

    fn player_flags(&self, player: PlayerId) -> Option<&[bool]> {
        let slot = player.index().checked_sub(1)?;
        self.flags.get(slot).map(|flags| &**flags)
    }

    /// Include a strategy, returning true if it wasn't already included
    pub fn add_strategy(&mut self, strategy: Strategy) -> Result<bool, NormalFormError> {
        let flag = self.flag_mut(strategy)?;
        Ok(!std::mem::replace(flag, true))
    }

    /// Exclude a strategy, returning true if it was included
    pub fn remove_strategy(&mut self, strategy: Strategy) -> Result<bool, NormalFormError> {
        let flag = self.flag_mut(strategy)?;
        Ok(std::mem::replace(flag, false))
    }

    /// True if the strategy is included, always false for strategies of other normal forms
    pub fn contains(&self, strategy: Strategy) -> bool {
        strategy.nfg == self.nfg && self.flags[strategy.slot()][strategy.index]
    }

    /// The number of included strategies of a player
    pub fn num_strategies(&self, player: PlayerId) -> Result<usize, NormalFormError> {
        let flags = self
            .player_flags(player)
            .ok_or(NormalFormError::InvalidPlayer)?;
        Ok(flags.iter().filter(|flag| **flag).count())
    }

    /// The total number of included strategies over all players
    pub fn profile_length(&self) -> usize {
        self.flags
            .iter()
            .flat_map(|flags| flags.iter())
            .filter(|flag| **flag)
            .count()
    }

    /// The `k`th included strategy of a player, in index order
    pub fn strategy(&self, player: PlayerId, k: usize) -> Option<Strategy> {
        let index = self
            .player_flags(player)?
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .nth(k)?
            .0;
        Some(Strategy {
            nfg: self.nfg,
            player,
            index,
        })
    }

    /// The position of a strategy among the included strategies of its player
    pub fn index_of(&self, strategy: Strategy) -> Option<usize> {
        if self.contains(strategy) {
            let flags = &self.flags[strategy.slot()][..strategy.index];
            Some(flags.iter().filter(|flag| **flag).count())
        } else {
            None
        }
    }

    /// True if every strategy included here is also included in `other`
    ///
    /// Supports of different normal forms are never subsets of each other.
    pub fn is_subset(&self, other: &Support) -> bool {
        self.nfg == other.nfg
            && self
                .flags
                .iter()
                .flat_map(|flags| flags.iter())
                .zip(other.flags.iter().flat_map(|flags| flags.iter()))
                .all(|(mine, theirs)| !mine || *theirs)
    }

    /// True if every player has at least one included strategy
    pub fn is_valid(&self) -> bool {
        self.flags.iter().all(|flags| flags.contains(&true))
    }

    /// The included strategy indices of each player
    pub(super) fn choices(&self) -> Box<[Box<[usize]>]> {
        self.flags
            .iter()
            .map(|flags| {
                flags
                    .iter()
                    .enumerate()
                    .filter(|(_, flag)| **flag)
                    .map(|(ind, _)| ind)
                    .collect()
            })
            .collect()
    }
}
