use super::Strategy;
use crate::{NormalFormError, PlayerId};
use std::iter::FusedIterator;
use std::sync::Arc;

/// A choice of pure strategy for some or all players
///
/// Contingencies also track their position in the flattened table of all contingencies, where the
/// first player's strategy varies fastest. Changing one player's strategy updates that position
/// in constant time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contingency {
    pub(super) nfg: u64,
    pub(super) strides: Arc<[usize]>,
    pub(super) profile: Box<[Option<usize>]>,
    // sum over assigned players only
    pub(super) index: usize,
}

impl Contingency {
    pub(super) fn new(nfg: u64, strides: Arc<[usize]>, profile: Box<[Option<usize>]>) -> Self {
        let index = profile
            .iter()
            .zip(strides.iter())
            .filter_map(|(ind, stride)| ind.map(|ind| ind * stride))
            .sum();
        Contingency {
            nfg,
            strides,
            profile,
            index,
        }
    }

    /// The position of this contingency in the flattened table, `None` unless it's complete
    pub fn index(&self) -> Option<usize> {
        self.is_valid().then_some(self.index)
    }

    /// True if every player has a strategy
    pub fn is_valid(&self) -> bool {
        self.profile.iter().all(Option::is_some)
    }

    /// The strategy assigned to a player, if any
    pub fn get(&self, player: PlayerId) -> Option<Strategy> {
        let slot = player.index().checked_sub(1)?;
        let index = (*self.profile.get(slot)?)?;
        Some(Strategy {
            nfg: self.nfg,
            player,
            index,
        })
    }

    /// Assign a strategy to its player, replacing the previous one
    pub fn set(&mut self, strategy: Strategy) -> Result<(), NormalFormError> {
        if strategy.nfg != self.nfg {
            Err(NormalFormError::ForeignProfile)
        } else {
            self.assign(strategy.slot(), Some(strategy.index));
            Ok(())
        }
    }

    /// Remove the strategy of a player
    pub fn unset(&mut self, player: PlayerId) -> Result<(), NormalFormError> {
        match player.index().checked_sub(1) {
            Some(slot) if slot < self.profile.len() => {
                self.assign(slot, None);
                Ok(())
            }
            _ => Err(NormalFormError::InvalidPlayer),
        }
    }

    /// Iterate over the assigned strategies in player order
    pub fn strategies(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.profile
            .iter()
            .enumerate()
            .filter_map(move |(slot, ind)| {
                ind.map(|index| Strategy {
                    nfg: self.nfg,
                    player: PlayerId::new(slot + 1),
                    index,
                })
            })
    }

    pub(super) fn assign(&mut self, slot: usize, index: Option<usize>) {
        let stride = self.strides[slot];
        if let Some(old) = self.profile[slot] {
            self.index -= old * stride;
        }
        if let Some(new) = index {
            self.index += new * stride;
        }
        self.profile[slot] = index;
    }
}

/// An iterator over every contingency of a [Support](crate::Support)
///
/// Created by [NormalForm::contingencies](crate::NormalForm::contingencies). The first player's
/// strategy varies fastest, so for the full support contingencies come in index order.
#[derive(Debug, Clone)]
pub struct Contingencies {
    // supported strategy indices per player
    choices: Box<[Box<[usize]>]>,
    positions: Box<[usize]>,
    current: Option<Contingency>,
    remaining: usize,
}

impl Contingencies {
    pub(super) fn new(nfg: u64, strides: Arc<[usize]>, choices: Box<[Box<[usize]>]>) -> Self {
        let remaining = choices.iter().map(|choice| choice.len()).product();
        let current = (remaining > 0).then(|| {
            let profile = choices.iter().map(|choice| Some(choice[0])).collect();
            Contingency::new(nfg, strides, profile)
        });
        Contingencies {
            positions: vec![0; choices.len()].into(),
            choices,
            current,
            remaining,
        }
    }

    fn advance(&mut self, cont: &mut Contingency) -> bool {
        let slots = self.positions.iter_mut().zip(self.choices.iter());
        for (slot, (pos, choice)) in slots.enumerate() {
            *pos += 1;
            if *pos < choice.len() {
                cont.assign(slot, Some(choice[*pos]));
                return true;
            }
            *pos = 0;
            cont.assign(slot, Some(choice[0]));
        }
        false
    }
}

impl Iterator for Contingencies {
    type Item = Contingency;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut next = current.clone();
        if self.advance(&mut next) {
            self.current = Some(next);
        }
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl FusedIterator for Contingencies {}

impl ExactSizeIterator for Contingencies {}
