use super::{Efg, NodeId};
use crate::payoff::Payoff;
use log::warn;
use std::collections::HashSet;

impl<T: Payoff> Efg<T> {
    /// Check every structural invariant of the game
    ///
    /// This walks the whole game and logs a warning for each violation it finds. Mutations keep
    /// the game consistent, so this should always return true; it exists to verify that in tests.
    pub fn is_consistent(&self) -> bool {
        let mut consistent = true;
        let mut fail = |msg: String| {
            warn!("{msg}");
            consistent = false;
        };

        match self.nodes.get(self.root.0) {
            None => fail("root isn't live".into()),
            Some(data) if data.parent.is_some() => fail("root has a parent".into()),
            Some(_) => (),
        }

        // bounded walk so a cycle can't hang the check
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if !seen.insert(node) || seen.len() > self.nodes.len() {
                fail(format!("{node:?} is reachable more than once"));
                break;
            }
            let Some(data) = self.nodes.get(node.0) else {
                fail(format!("{node:?} is a dangling child"));
                continue;
            };
            for child in &data.children {
                match self.nodes.get(child.0) {
                    Some(child_data) if child_data.parent == Some(node) => stack.push(*child),
                    Some(_) => fail(format!("{child:?} doesn't point back to {node:?}")),
                    None => fail(format!("{node:?} has a dead child {child:?}")),
                }
            }
            match data.infoset {
                None if !data.children.is_empty() => {
                    fail(format!("{node:?} has children but no information set"))
                }
                None => (),
                Some(infoset) => match self.infosets.get(infoset.0) {
                    None => fail(format!("{node:?} is in dead infoset {infoset:?}")),
                    Some(info) => {
                        if info.actions.len() != data.children.len() {
                            fail(format!("{node:?} doesn't have one child per action"));
                        }
                        if !info.members.contains(&node) {
                            fail(format!("{infoset:?} doesn't list member {node:?}"));
                        }
                    }
                },
            }
            if let Some(outcome) = data.outcome {
                if !self.outcomes.contains(outcome.0) {
                    fail(format!("{node:?} has dead outcome {outcome:?}"));
                }
            }
            if data.subgame && !self.is_legal_subgame(node) {
                fail(format!("{node:?} is marked but not a legal subgame"));
            }
        }
        if seen.len() != self.nodes.len() {
            fail(format!(
                "{} nodes are stored but {} are reachable",
                self.nodes.len(),
                seen.len()
            ));
        }

        let mut listed = 0;
        for (ind, player) in self.players.iter().enumerate() {
            for infoset in &player.infosets {
                listed += 1;
                let Some(info) = self.infosets.get(infoset.0) else {
                    fail(format!("player {ind} lists dead infoset {infoset:?}"));
                    continue;
                };
                if info.player.0 != ind {
                    fail(format!("{infoset:?} is listed by the wrong player"));
                }
                let chance = info.player.is_chance();
                if info.actions.iter().any(|action| action.prob.is_some() != chance) {
                    fail(format!("{infoset:?} has mismatched action probabilities"));
                }
                let stray = |member: &NodeId| {
                    !seen.contains(member) || self.nodes[member.0].infoset != Some(*infoset)
                };
                if info.members.iter().any(stray) {
                    fail(format!("{infoset:?} lists a node that isn't in it"));
                }
            }
        }
        if listed != self.infosets.len() {
            fail("some information sets aren't listed by their player".into());
        }

        let players = self.num_players();
        if self
            .outcomes
            .iter()
            .any(|(_, outcome)| outcome.payoffs.len() != players)
        {
            fail("some outcomes don't have one payoff per player".into());
        }

        consistent
    }
}

#[cfg(test)]
mod tests {
    use crate::{Efg, MoveTarget, PlayerId};

    #[test]
    fn test_fresh_game() {
        let game = Efg::<f64>::new(["one"]);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_detects_corruption() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game
            .add_move(
                root,
                MoveTarget::New {
                    player: PlayerId::new(1),
                    actions: 2,
                },
            )
            .unwrap();
        assert!(game.is_consistent());
        game.infosets[infoset.0].members.clear();
        assert!(!game.is_consistent());
    }
}
