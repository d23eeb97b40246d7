//! The normal form of an extensive form game
//!
//! A [NormalForm] lists every pure strategy of every personal player and assigns a payoff vector
//! to each contingency, i.e. each choice of one strategy per player. Strategies aren't stored
//! explicitly. A player's strategy index is a mixed radix number with one digit per information
//! set of that player, the first information set being the least significant digit, and the
//! digit is the action chosen there. Contingencies are in turn numbered with the first player
//! least significant.
//!
//! Payoffs are computed on demand by walking a snapshot of the game, or read from a table built
//! by [NormalForm::materialize]. Once a payoff is overridden with [NormalForm::set_outcome] the
//! normal form is detached from the game for good, and only the table is consulted.
mod contingency;
mod strategy;
mod support;

pub use contingency::{Contingencies, Contingency};
pub use strategy::Strategy;
pub use support::Support;

use crate::payoff::Payoff;
use crate::{Efg, InfosetId, NodeKind, NormalFormError, PlayerId};
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy)]
struct Digit {
    slot: usize,
    stride: usize,
    radix: usize,
}

/// The strategic form of an [Efg]
#[derive(Debug)]
pub struct NormalForm<T> {
    id: u64,
    source: Option<Efg<T>>,
    game: u64,
    revision: u64,
    infosets: Box<[Box<[InfosetId]>]>,
    radices: Box<[Box<[usize]>]>,
    counts: Box<[usize]>,
    strides: Arc<[usize]>,
    size: usize,
    digits: HashMap<InfosetId, Digit>,
    table: Option<Box<[Option<Box<[T]>>]>>,
}

impl<T: Payoff> NormalForm<T> {
    /// Derive the normal form of a game
    ///
    /// The normal form keeps its own snapshot of the game, so later edits to `game` don't affect
    /// it until [NormalForm::refresh] is called.
    ///
    /// # Errors
    ///
    /// If the number of strategies of a player or the number of contingencies doesn't fit in a
    /// `usize`.
    pub fn new(game: &Efg<T>) -> Result<Self, NormalFormError> {
        let infosets: Box<[Box<[InfosetId]>]> = game
            .players()
            .map(|player| game.player_infosets(player).into())
            .collect();
        let radices: Box<[Box<[usize]>]> = infosets
            .iter()
            .map(|infosets| {
                infosets
                    .iter()
                    .map(|infoset| game.num_actions(*infoset))
                    .collect()
            })
            .collect();

        let mut digits = HashMap::new();
        let mut counts = Vec::with_capacity(radices.len());
        for (slot, (infosets, radices)) in infosets.iter().zip(radices.iter()).enumerate() {
            let mut stride = 1_usize;
            for (infoset, radix) in infosets.iter().zip(radices.iter()) {
                digits.insert(
                    *infoset,
                    Digit {
                        slot,
                        stride,
                        radix: *radix,
                    },
                );
                stride = stride
                    .checked_mul(*radix)
                    .ok_or(NormalFormError::TooManyContingencies)?;
            }
            counts.push(stride);
        }

        let mut strides = Vec::with_capacity(counts.len());
        let mut size = 1_usize;
        for count in &counts {
            strides.push(size);
            size = size
                .checked_mul(*count)
                .ok_or(NormalFormError::TooManyContingencies)?;
        }
        debug!("derived a normal form with {size} contingencies from strategy counts {counts:?}");

        Ok(NormalForm {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            source: Some(game.clone()),
            game: game.instance(),
            revision: game.revision(),
            infosets,
            radices,
            counts: counts.into(),
            strides: strides.into(),
            size,
            digits,
            table: None,
        })
    }

    fn slot(&self, player: PlayerId) -> Result<usize, NormalFormError> {
        match player.index().checked_sub(1) {
            Some(slot) if slot < self.counts.len() => Ok(slot),
            _ => Err(NormalFormError::InvalidPlayer),
        }
    }

    fn check_strategy(&self, strategy: Strategy) -> Result<(), NormalFormError> {
        if strategy.nfg == self.id {
            Ok(())
        } else {
            Err(NormalFormError::ForeignProfile)
        }
    }

    /// The number of personal players
    pub fn num_players(&self) -> usize {
        self.counts.len()
    }

    /// Iterate over the personal players
    pub fn players(&self) -> impl ExactSizeIterator<Item = PlayerId> {
        (0..self.counts.len()).map(|slot| PlayerId::new(slot + 1))
    }

    /// The number of pure strategies of a player
    ///
    /// A player without information sets has one empty strategy.
    pub fn num_strategies(&self, player: PlayerId) -> Result<usize, NormalFormError> {
        Ok(self.counts[self.slot(player)?])
    }

    /// Iterate over the pure strategies of a player
    pub fn strategies(
        &self,
        player: PlayerId,
    ) -> Result<impl ExactSizeIterator<Item = Strategy>, NormalFormError> {
        let num = self.num_strategies(player)?;
        let nfg = self.id;
        Ok((0..num).map(move |index| Strategy { nfg, player, index }))
    }

    /// The pure strategy of a player with a given index
    pub fn strategy(&self, player: PlayerId, index: usize) -> Result<Strategy, NormalFormError> {
        if index < self.num_strategies(player)? {
            Ok(Strategy {
                nfg: self.id,
                player,
                index,
            })
        } else {
            Err(NormalFormError::StrategyOutOfRange)
        }
    }

    /// The action a strategy picks at each of its player's information sets
    ///
    /// Information sets are listed in the order the player owned them when this normal form was
    /// derived.
    pub fn strategy_choices(
        &self,
        strategy: Strategy,
    ) -> Result<Vec<(InfosetId, usize)>, NormalFormError> {
        self.check_strategy(strategy)?;
        let slot = strategy.slot();
        let mut rem = strategy.index;
        Ok(self.infosets[slot]
            .iter()
            .zip(self.radices[slot].iter())
            .map(|(infoset, radix)| {
                let action = rem % radix;
                rem /= radix;
                (*infoset, action)
            })
            .collect())
    }

    /// A compact label for a strategy: the one based action picked at each information set
    ///
    /// For example `"21"` picks the second action at the first information set and the first
    /// action at the second.
    pub fn strategy_label(&self, strategy: Strategy) -> Result<String, NormalFormError> {
        Ok(self
            .strategy_choices(strategy)?
            .into_iter()
            .map(|(_, action)| (action + 1).to_string())
            .collect())
    }

    /// The total number of contingencies
    pub fn size(&self) -> usize {
        self.size
    }

    /// The contingency where every player plays their first strategy
    pub fn contingency(&self) -> Contingency {
        let profile = vec![Some(0); self.counts.len()].into();
        Contingency::new(self.id, self.strides.clone(), profile)
    }

    /// A contingency where no player has a strategy yet
    pub fn blank_contingency(&self) -> Contingency {
        let profile = vec![None; self.counts.len()].into();
        Contingency::new(self.id, self.strides.clone(), profile)
    }

    /// The contingency at a position of the flattened table
    pub fn decode(&self, index: usize) -> Result<Contingency, NormalFormError> {
        if index >= self.size {
            return Err(NormalFormError::IndexOutOfRange);
        }
        let profile = self
            .strides
            .iter()
            .zip(self.counts.iter())
            .map(|(stride, count)| Some(index / stride % count))
            .collect();
        Ok(Contingency::new(self.id, self.strides.clone(), profile))
    }

    /// A support containing every strategy
    pub fn support(&self) -> Support {
        Support::full(self.id, &self.counts)
    }

    /// Iterate over every contingency of the supported strategies
    ///
    /// An invalid support, where some player has no strategy, has no contingencies.
    pub fn contingencies(&self, support: &Support) -> Result<Contingencies, NormalFormError> {
        if support.nfg != self.id {
            Err(NormalFormError::ForeignProfile)
        } else {
            Ok(Contingencies::new(
                self.id,
                self.strides.clone(),
                support.choices(),
            ))
        }
    }

    fn check_contingency(&self, cont: &Contingency) -> Result<usize, NormalFormError> {
        if cont.nfg != self.id {
            Err(NormalFormError::ForeignProfile)
        } else {
            cont.index().ok_or(NormalFormError::IncompleteContingency)
        }
    }

    /// The payoff to every personal player under a contingency
    pub fn payoffs(&self, cont: &Contingency) -> Result<Vec<T>, NormalFormError> {
        let index = self.check_contingency(cont)?;
        match (&self.table, &self.source) {
            (Some(table), _) => Ok(match &table[index] {
                Some(payoffs) => payoffs.to_vec(),
                None => vec![T::zero(); self.num_players()],
            }),
            (None, Some(game)) => Ok(self.trace(game, index)),
            (None, None) => Err(NormalFormError::Detached),
        }
    }

    /// The stored outcome of a contingency, `None` if no payoffs were ever stored for it
    ///
    /// Unlike [NormalForm::payoffs] this tells an empty cell of a detached normal form apart from
    /// one whose payoffs are all zero.
    ///
    /// # Errors
    ///
    /// If payoffs are traced from the game rather than read from a table.
    pub fn outcome(&self, cont: &Contingency) -> Result<Option<&[T]>, NormalFormError> {
        let index = self.check_contingency(cont)?;
        let table = self.table.as_ref().ok_or(NormalFormError::NotMaterialized)?;
        Ok(table[index].as_deref())
    }

    /// The payoff to one personal player under a contingency
    pub fn payoff(&self, cont: &Contingency, player: PlayerId) -> Result<T, NormalFormError> {
        let slot = self.slot(player)?;
        let mut payoffs = self.payoffs(cont)?;
        Ok(payoffs.swap_remove(slot))
    }

    /// Override the payoffs of a contingency, `None` leaves it with no outcome
    ///
    /// This detaches the normal form from its game, see [NormalForm::break_link].
    pub fn set_outcome(
        &mut self,
        cont: &Contingency,
        payoffs: Option<Vec<T>>,
    ) -> Result<(), NormalFormError> {
        let index = self.check_contingency(cont)?;
        if matches!(&payoffs, Some(payoffs) if payoffs.len() != self.num_players()) {
            return Err(NormalFormError::PayoffsNotEqual);
        }
        self.break_link();
        if let Some(table) = &mut self.table {
            table[index] = payoffs.map(Vec::into_boxed_slice);
        }
        Ok(())
    }

    /// Compute and store the payoff of every contingency
    ///
    /// Contingencies are evaluated in parallel on the current rayon pool.
    pub fn materialize(&mut self) -> Result<(), NormalFormError> {
        let game = self.source.as_ref().ok_or(NormalFormError::Detached)?;
        let table = (0..self.size)
            .into_par_iter()
            .map(|index| Some(self.trace(game, index).into_boxed_slice()))
            .collect::<Vec<_>>();
        debug!("materialized {} contingencies", table.len());
        self.table = Some(table.into());
        Ok(())
    }

    /// True if payoffs are read from a table
    pub fn is_materialized(&self) -> bool {
        self.table.is_some()
    }

    /// True if this normal form still reads payoffs from its game
    pub fn is_linked(&self) -> bool {
        self.source.is_some()
    }

    /// Detach this normal form from its game
    ///
    /// Payoffs that were never materialized become zero. This can't be undone.
    pub fn break_link(&mut self) {
        if self.source.take().is_some() {
            debug!("detached normal form {}", self.id);
        }
        if self.table.is_none() {
            self.table = Some((0..self.size).map(|_| None).collect());
        }
    }

    /// True if this normal form is linked to `game` and reflects its latest revision
    ///
    /// Only the game value the normal form was derived from can be current, clones of it never
    /// are.
    pub fn is_current(&self, game: &Efg<T>) -> bool {
        self.is_linked() && game.instance() == self.game && game.revision() == self.revision
    }

    /// Rederive this normal form from a game, returning true if anything changed
    ///
    /// A refreshed normal form has a new identity, so strategies, contingencies and supports from
    /// before the refresh are foreign to it. A materialized table is rebuilt.
    pub fn refresh(&mut self, game: &Efg<T>) -> Result<bool, NormalFormError> {
        if !self.is_linked() {
            Err(NormalFormError::Detached)
        } else if self.is_current(game) {
            Ok(false)
        } else {
            let materialized = self.is_materialized();
            *self = NormalForm::new(game)?;
            if materialized {
                self.materialize()?;
            }
            Ok(true)
        }
    }

    /// Follow a contingency through the game tree
    ///
    /// Chance nodes contribute the expectation over their children, and every outcome met on the
    /// way is added in, weighted by the probability of reaching it.
    fn trace(&self, game: &Efg<T>, index: usize) -> Vec<T> {
        let profile: Vec<_> = self
            .strides
            .iter()
            .zip(self.counts.iter())
            .map(|(stride, count)| index / stride % count)
            .collect();
        let mut totals = vec![T::zero(); self.num_players()];
        let mut stack = vec![(game.root(), T::one())];
        while let Some((node, weight)) = stack.pop() {
            if let Some(outcome) = game.outcome(node) {
                for (total, payoff) in totals.iter_mut().zip(game.payoffs(outcome)) {
                    *total = total.clone() + weight.clone() * payoff.clone();
                }
            }
            match (game.kind(node), game.infoset(node)) {
                (NodeKind::Chance, Some(infoset)) => {
                    for (action, child) in game.children(node).iter().enumerate() {
                        let prob = game.action_prob(infoset, action).cloned();
                        if let Some(prob) = prob.filter(|prob| *prob > T::zero()) {
                            stack.push((*child, weight.clone() * prob));
                        }
                    }
                }
                (NodeKind::Decision(_), Some(infoset)) => {
                    let digit = self.digits[&infoset];
                    let action = profile[digit.slot] / digit.stride % digit.radix;
                    stack.push((game.children(node)[action], weight));
                }
                _ => (),
            }
        }
        totals
    }
}
