//! Structural mutation of an extensive form
//!
//! Every public method here checks all of its arguments before the first write, so an error
//! always leaves the game untouched. The private helpers below assume valid handles.
use super::{
    ActionData, Efg, InfosetData, InfosetId, MoveTarget, NodeData, NodeId, OutcomeData,
    OutcomeId, PlayerData, PlayerId,
};
use crate::payoff::{self, Payoff};
use crate::GameError;
use log::debug;
use std::mem;

impl<T: Payoff> Efg<T> {
    fn check_node(&self, node: NodeId) -> Result<&NodeData, GameError> {
        self.nodes.get(node.0).ok_or(GameError::InvalidNode)
    }

    fn check_infoset(&self, infoset: InfosetId) -> Result<&InfosetData<T>, GameError> {
        self.infosets.get(infoset.0).ok_or(GameError::InvalidInfoset)
    }

    fn check_outcome(&self, outcome: OutcomeId) -> Result<&OutcomeData<T>, GameError> {
        self.outcomes.get(outcome.0).ok_or(GameError::InvalidOutcome)
    }

    fn check_player(&self, player: PlayerId) -> Result<&PlayerData, GameError> {
        self.players.get(player.0).ok_or(GameError::InvalidPlayer)
    }

    fn check_personal(&self, player: PlayerId) -> Result<usize, GameError> {
        if player.is_chance() {
            Err(GameError::InvalidPlayer)
        } else {
            self.check_player(player)?;
            Ok(player.0 - 1)
        }
    }

    /// Validate a move target and return its number of actions
    fn check_target(&self, target: MoveTarget) -> Result<usize, GameError> {
        match target {
            MoveTarget::Infoset(infoset) => Ok(self.check_infoset(infoset)?.actions.len()),
            MoveTarget::New { player, actions } => {
                self.check_player(player)?;
                if actions == 0 {
                    Err(GameError::NoActions)
                } else {
                    Ok(actions)
                }
            }
        }
    }

    fn realize_target(&mut self, target: MoveTarget) -> InfosetId {
        match target {
            MoveTarget::Infoset(infoset) => infoset,
            MoveTarget::New { player, actions } => {
                self.insert_infoset(InfosetData::new(player, actions))
            }
        }
    }

    fn insert_infoset(&mut self, data: InfosetData<T>) -> InfosetId {
        let player = data.player;
        let infoset = InfosetId(self.infosets.insert(data));
        self.players[player.0].infosets.push(infoset);
        infoset
    }

    fn alloc(&mut self, parent: NodeId) -> NodeId {
        NodeId(self.nodes.insert(NodeData {
            parent: Some(parent),
            ..NodeData::default()
        }))
    }

    fn fresh_children(&mut self, parent: NodeId, num: usize) -> Vec<NodeId> {
        (0..num).map(|_| self.alloc(parent)).collect()
    }

    fn join(&mut self, node: NodeId, infoset: InfosetId) {
        self.infosets[infoset.0].members.insert(node);
        self.nodes[node.0].infoset = Some(infoset);
    }

    /// Remove a node from its information set, destroying the set if it empties
    fn leave(&mut self, node: NodeId) {
        if let Some(infoset) = self.nodes[node.0].infoset.take() {
            let data = &mut self.infosets[infoset.0];
            data.members.shift_remove(&node);
            if data.members.is_empty() {
                self.destroy_infoset(infoset);
            }
        }
    }

    fn destroy_infoset(&mut self, infoset: InfosetId) {
        if let Some(data) = self.infosets.remove(infoset.0) {
            self.players[data.player.0]
                .infosets
                .retain(|other| *other != infoset);
            debug!("destroyed empty infoset {infoset:?}");
        }
    }

    /// Destroy a node and everything below it
    ///
    /// The node isn't removed from its parent's children.
    fn destroy(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(next) = stack.pop() {
            self.leave(next);
            if let Some(data) = self.nodes.remove(next.0) {
                stack.extend(data.children);
            }
        }
    }

    /// Put `new` where `old` is in the tree, `old` is left without a parent
    fn replace_in_parent(&mut self, old: NodeId, new: NodeId) {
        let parent = self.nodes[old.0].parent.take();
        self.nodes[new.0].parent = parent;
        match parent {
            Some(parent) => {
                if let Some(slot) = self.nodes[parent.0]
                    .children
                    .iter_mut()
                    .find(|child| **child == old)
                {
                    *slot = new;
                }
            }
            None => self.root = new,
        }
    }

    fn copy_node(&mut self, orig: NodeId, parent: NodeId) -> NodeId {
        let data = &self.nodes[orig.0];
        let (label, children, infoset, outcome) = (
            data.label.clone(),
            data.children.clone(),
            data.infoset,
            data.outcome,
        );
        let copy = NodeId(self.nodes.insert(NodeData {
            label,
            parent: Some(parent),
            outcome,
            ..NodeData::default()
        }));
        if let Some(infoset) = infoset {
            self.join(copy, infoset);
        }
        let copies = children
            .into_iter()
            .map(|child| self.copy_node(child, copy))
            .collect();
        self.nodes[copy.0].children = copies;
        copy
    }

    /// Advance the revision after a change that doesn't affect tree shape
    pub(super) fn touch(&mut self) {
        self.revision += 1;
    }

    /// Advance the revision after a change to the tree or its information sets
    fn restructure(&mut self) {
        self.prune_subgames();
        self.touch();
    }

    /// Give a terminal node a move
    ///
    /// The node joins the target information set and gets one new terminal child per action.
    /// Returns the information set the node joined.
    pub fn add_move(&mut self, node: NodeId, target: MoveTarget) -> Result<InfosetId, GameError> {
        if !self.check_node(node)?.children.is_empty() {
            return Err(GameError::NotTerminal);
        }
        let num = self.check_target(target)?;
        let infoset = self.realize_target(target);
        self.join(node, infoset);
        let children = self.fresh_children(node, num);
        self.nodes[node.0].children = children;
        debug!("added a move with {num} actions at {node:?}");
        self.restructure();
        Ok(infoset)
    }

    /// Insert a move directly above a node
    ///
    /// A new decision node takes the place of `node` in the tree, with `node` as its first child
    /// and fresh terminal nodes for the remaining actions. Returns the new node.
    pub fn insert_move(&mut self, node: NodeId, target: MoveTarget) -> Result<NodeId, GameError> {
        self.check_node(node)?;
        let num = self.check_target(target)?;
        let infoset = self.realize_target(target);
        let fresh = self.alloc(node);
        self.replace_in_parent(node, fresh);
        self.nodes[node.0].parent = Some(fresh);
        let mut children = Vec::with_capacity(num);
        children.push(node);
        children.extend(self.fresh_children(fresh, num - 1));
        self.nodes[fresh.0].children = children;
        self.join(fresh, infoset);
        debug!("inserted a move with {num} actions above {node:?}");
        self.restructure();
        Ok(fresh)
    }

    /// Remove the move at a node, keeping the subtree of one of its actions
    ///
    /// The subtree under child `keep` replaces `node`, the other subtrees are destroyed. Returns
    /// the kept child.
    pub fn delete_move(&mut self, node: NodeId, keep: usize) -> Result<NodeId, GameError> {
        let data = self.check_node(node)?;
        if data.children.is_empty() {
            return Err(GameError::Terminal);
        }
        let kept = *data.children.get(keep).ok_or(GameError::ActionOutOfRange)?;
        for child in mem::take(&mut self.nodes[node.0].children) {
            if child != kept {
                self.destroy(child);
            }
        }
        self.leave(node);
        self.replace_in_parent(node, kept);
        self.nodes.remove(node.0);
        debug!("deleted the move at {node:?} keeping {kept:?}");
        self.restructure();
        Ok(kept)
    }

    /// Make a node terminal, destroying everything below it
    ///
    /// The node keeps its label and outcome.
    pub fn delete_tree(&mut self, node: NodeId) -> Result<(), GameError> {
        self.check_node(node)?;
        for child in mem::take(&mut self.nodes[node.0].children) {
            self.destroy(child);
        }
        self.leave(node);
        debug!("deleted the tree below {node:?}");
        self.restructure();
        Ok(())
    }

    /// Remove every information set without members, returning how many were removed
    pub fn delete_empty_infosets(&mut self) -> usize {
        let empty: Vec<_> = self
            .infosets()
            .filter(|infoset| self.infosets[infoset.0].members.is_empty())
            .collect();
        for infoset in &empty {
            self.destroy_infoset(*infoset);
        }
        if !empty.is_empty() {
            self.touch();
        }
        empty.len()
    }

    /// Create an information set without members
    ///
    /// Nodes can join it with [Efg::add_move] or [Efg::join_infoset]. It persists until it gains
    /// and then loses all its members, or until [Efg::delete_empty_infosets].
    pub fn create_infoset(
        &mut self,
        player: PlayerId,
        actions: usize,
    ) -> Result<InfosetId, GameError> {
        let target = MoveTarget::New { player, actions };
        self.check_target(target)?;
        let infoset = self.realize_target(target);
        self.touch();
        Ok(infoset)
    }

    /// Replace the subtree at `dest` with a copy of the subtree at `src`
    ///
    /// Copied nodes join the same information sets as the nodes they copy and share their
    /// outcomes, so a copy plays the same decision again rather than a new one. `dest` keeps its
    /// own label and outcome. `dest` may lie inside the copied subtree, in which case the copy is
    /// taken of the tree as it was before the call.
    pub fn copy_tree(&mut self, src: NodeId, dest: NodeId) -> Result<(), GameError> {
        self.check_node(src)?;
        self.check_node(dest)?;
        if src == dest {
            return Err(GameError::SameNode);
        }
        let infoset = self.nodes[src.0].infoset;
        let originals = self.nodes[src.0].children.clone();
        let copies = originals
            .into_iter()
            .map(|orig| self.copy_node(orig, dest))
            .collect();
        // join before destroying the old subtree, which may hold the last member of `infoset`
        self.leave(dest);
        if let Some(infoset) = infoset {
            self.join(dest, infoset);
        }
        for child in mem::replace(&mut self.nodes[dest.0].children, copies) {
            self.destroy(child);
        }
        debug!("copied the tree at {src:?} to {dest:?}");
        self.restructure();
        Ok(())
    }

    /// Move the subtree at `src` to `dest`, replacing what was there
    ///
    /// `src` becomes terminal. The moved nodes keep their handles.
    pub fn move_tree(&mut self, src: NodeId, dest: NodeId) -> Result<(), GameError> {
        self.check_node(src)?;
        self.check_node(dest)?;
        if src == dest {
            return Err(GameError::SameNode);
        } else if self.is_ancestor(src, dest) || self.is_ancestor(dest, src) {
            return Err(GameError::OverlappingTrees);
        }
        for child in mem::take(&mut self.nodes[dest.0].children) {
            self.destroy(child);
        }
        self.leave(dest);
        let moved = mem::take(&mut self.nodes[src.0].children);
        for child in &moved {
            self.nodes[child.0].parent = Some(dest);
        }
        self.nodes[dest.0].children = moved;
        if let Some(infoset) = self.nodes[src.0].infoset.take() {
            let members = &mut self.infosets[infoset.0].members;
            members.shift_remove(&src);
            members.insert(dest);
            self.nodes[dest.0].infoset = Some(infoset);
        }
        debug!("moved the tree at {src:?} to {dest:?}");
        self.restructure();
        Ok(())
    }

    /// Move every member of `from` into `into` and destroy `from`
    ///
    /// Both must have the same number of actions; `into` keeps its owner and labels.
    pub fn merge_infosets(&mut self, into: InfosetId, from: InfosetId) -> Result<(), GameError> {
        let num = self.check_infoset(into)?.actions.len();
        if self.check_infoset(from)?.actions.len() != num {
            return Err(GameError::ActionsNotEqual);
        }
        if into != from {
            let members = mem::take(&mut self.infosets[from.0].members);
            for member in members {
                self.join(member, into);
            }
            self.destroy_infoset(from);
            debug!("merged infoset {from:?} into {into:?}");
        }
        self.restructure();
        Ok(())
    }

    /// Move a decision node into a fresh information set of its own
    ///
    /// The new set copies the owner, action labels and probabilities of the old one. If the node
    /// is already the only member, its information set is returned unchanged.
    pub fn split_infoset(&mut self, node: NodeId) -> Result<InfosetId, GameError> {
        let infoset = self.check_node(node)?.infoset.ok_or(GameError::Terminal)?;
        let old = &self.infosets[infoset.0];
        if old.members.len() == 1 {
            return Ok(infoset);
        }
        let fresh = InfosetData {
            player: old.player,
            label: String::new(),
            actions: old.actions.clone(),
            members: Default::default(),
        };
        let fresh = self.insert_infoset(fresh);
        self.leave(node);
        self.join(node, fresh);
        debug!("split {node:?} out of infoset {infoset:?}");
        self.restructure();
        Ok(fresh)
    }

    /// Move a decision node into another information set with the same number of actions
    pub fn join_infoset(&mut self, node: NodeId, infoset: InfosetId) -> Result<(), GameError> {
        let data = self.check_node(node)?;
        let current = data.infoset.ok_or(GameError::Terminal)?;
        let num = data.children.len();
        if self.check_infoset(infoset)?.actions.len() != num {
            return Err(GameError::ActionsNotEqual);
        }
        if current != infoset {
            self.leave(node);
            self.join(node, infoset);
            debug!("moved {node:?} into infoset {infoset:?}");
        }
        self.restructure();
        Ok(())
    }

    /// Remove an action from an information set
    ///
    /// Every member loses the subtree under that action and its later children shift down. Chance
    /// probabilities of the remaining actions are renormalized.
    pub fn delete_action(&mut self, infoset: InfosetId, action: usize) -> Result<(), GameError> {
        let data = self.check_infoset(infoset)?;
        if action >= data.actions.len() {
            return Err(GameError::ActionOutOfRange);
        } else if data.actions.len() == 1 {
            return Err(GameError::LastAction);
        }
        let members: Vec<_> = data.members.iter().copied().collect();
        for member in members {
            // members nested under an earlier member may already be gone
            if let Some(node) = self.nodes.get_mut(member.0) {
                let child = node.children.remove(action);
                self.destroy(child);
            }
        }
        let actions = &mut self.infosets[infoset.0].actions;
        actions.remove(action);
        renormalize(actions);
        debug!("deleted action {action} of infoset {infoset:?}");
        self.restructure();
        Ok(())
    }

    /// Add an action to an information set before position `at`
    ///
    /// Every member gets a fresh terminal child for it. New chance actions have probability zero.
    pub fn insert_action(&mut self, infoset: InfosetId, at: usize) -> Result<(), GameError> {
        let data = self.check_infoset(infoset)?;
        if at > data.actions.len() {
            return Err(GameError::ActionOutOfRange);
        }
        let members: Vec<_> = data.members.iter().copied().collect();
        let prob = data.player.is_chance().then(T::zero);
        self.infosets[infoset.0].actions.insert(
            at,
            ActionData {
                label: String::new(),
                prob,
            },
        );
        for member in members {
            let child = self.alloc(member);
            self.nodes[member.0].children.insert(at, child);
        }
        debug!("inserted action {at} into infoset {infoset:?}");
        self.restructure();
        Ok(())
    }

    /// Set the probabilities of a chance information set
    pub fn set_chance_probs(&mut self, infoset: InfosetId, probs: Vec<T>) -> Result<(), GameError> {
        let data = self.check_infoset(infoset)?;
        if !data.player.is_chance() {
            return Err(GameError::NotChance);
        } else if probs.len() != data.actions.len() || !probs.iter().all(|p| *p >= T::zero()) {
            return Err(GameError::InvalidProbability);
        }
        for (action, prob) in self.infosets[infoset.0].actions.iter_mut().zip(probs) {
            action.prob = Some(prob);
        }
        self.touch();
        Ok(())
    }

    /// Add a personal player
    ///
    /// Every existing outcome gets a zero payoff for them.
    pub fn new_player(&mut self, label: impl Into<String>) -> PlayerId {
        self.players.push(PlayerData {
            label: label.into(),
            infosets: Vec::new(),
        });
        let keys: Vec<_> = self.outcomes.iter().map(|(key, _)| key).collect();
        for key in keys {
            self.outcomes[key].payoffs.push(T::zero());
        }
        self.touch();
        PlayerId(self.players.len() - 1)
    }

    /// Create an outcome with one payoff per personal player
    pub fn new_outcome(&mut self, payoffs: Vec<T>) -> Result<OutcomeId, GameError> {
        if payoffs.len() != self.num_players() {
            return Err(GameError::PayoffsNotEqual);
        }
        Ok(OutcomeId(self.outcomes.insert(OutcomeData {
            label: String::new(),
            payoffs,
        })))
    }

    /// Change the payoff of an outcome to one personal player
    pub fn set_payoff(
        &mut self,
        outcome: OutcomeId,
        player: PlayerId,
        value: T,
    ) -> Result<(), GameError> {
        self.check_outcome(outcome)?;
        let ind = self.check_personal(player)?;
        self.outcomes[outcome.0].payoffs[ind] = value;
        self.touch();
        Ok(())
    }

    /// Attach an outcome to a node, or detach its outcome with `None`
    pub fn set_outcome(
        &mut self,
        node: NodeId,
        outcome: Option<OutcomeId>,
    ) -> Result<(), GameError> {
        self.check_node(node)?;
        if let Some(outcome) = outcome {
            self.check_outcome(outcome)?;
        }
        self.nodes[node.0].outcome = outcome;
        self.touch();
        Ok(())
    }

    /// Delete an outcome, detaching it from every node
    pub fn delete_outcome(&mut self, outcome: OutcomeId) -> Result<(), GameError> {
        self.check_outcome(outcome)?;
        let attached: Vec<_> = self
            .nodes()
            .filter(|node| self.nodes[node.0].outcome == Some(outcome))
            .collect();
        for node in attached {
            self.nodes[node.0].outcome = None;
        }
        self.outcomes.remove(outcome.0);
        debug!("deleted outcome {outcome:?}");
        self.touch();
        Ok(())
    }

    /// Set the label of a node
    pub fn set_node_label(
        &mut self,
        node: NodeId,
        label: impl Into<String>,
    ) -> Result<(), GameError> {
        self.check_node(node)?;
        self.nodes[node.0].label = label.into();
        Ok(())
    }

    /// Set the label of an information set
    pub fn set_infoset_label(
        &mut self,
        infoset: InfosetId,
        label: impl Into<String>,
    ) -> Result<(), GameError> {
        self.check_infoset(infoset)?;
        self.infosets[infoset.0].label = label.into();
        Ok(())
    }

    /// Set the label of an action
    pub fn set_action_label(
        &mut self,
        infoset: InfosetId,
        action: usize,
        label: impl Into<String>,
    ) -> Result<(), GameError> {
        let slot = self.infosets.get_mut(infoset.0).ok_or(GameError::InvalidInfoset)?;
        let action = slot
            .actions
            .get_mut(action)
            .ok_or(GameError::ActionOutOfRange)?;
        action.label = label.into();
        Ok(())
    }

    /// Set the label of a player
    pub fn set_player_label(
        &mut self,
        player: PlayerId,
        label: impl Into<String>,
    ) -> Result<(), GameError> {
        self.check_player(player)?;
        self.players[player.0].label = label.into();
        Ok(())
    }

    /// Set the label of an outcome
    pub fn set_outcome_label(
        &mut self,
        outcome: OutcomeId,
        label: impl Into<String>,
    ) -> Result<(), GameError> {
        self.check_outcome(outcome)?;
        self.outcomes[outcome.0].label = label.into();
        Ok(())
    }
}

/// Scale chance probabilities back to one, personal actions are left alone
fn renormalize<T: Payoff>(actions: &mut [ActionData<T>]) {
    let total = payoff::sum(actions.iter().filter_map(|action| action.prob.as_ref()));
    if total > T::zero() {
        for prob in actions.iter_mut().filter_map(|action| action.prob.as_mut()) {
            *prob = prob.clone() / total.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Efg, MoveTarget, PlayerId, Rational};

    fn decision(player: usize, actions: usize) -> MoveTarget {
        MoveTarget::New {
            player: PlayerId::new(player),
            actions,
        }
    }

    #[test]
    fn test_add_move() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game.add_move(root, decision(1, 3)).unwrap();
        assert_eq!(game.num_children(root), 3);
        assert_eq!(game.num_members(infoset), 1);
        assert_eq!(game.revision(), 1);
        assert!(game.children(root).iter().all(|c| game.is_terminal(*c)));
        assert!(game.is_consistent());
    }

    #[test]
    fn test_insert_move_at_root() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let old_root = game.root();
        game.add_move(old_root, decision(2, 2)).unwrap();
        let fresh = game.insert_move(old_root, decision(1, 3)).unwrap();
        assert_eq!(game.root(), fresh);
        assert_eq!(game.parent(old_root), Some(fresh));
        assert_eq!(game.children(fresh)[0], old_root);
        assert_eq!(game.num_children(fresh), 3);
        assert_eq!(game.num_nodes(), 6);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_insert_move_below() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let right = game.children(root)[1];
        let fresh = game.insert_move(right, decision(2, 2)).unwrap();
        assert_eq!(game.children(root)[1], fresh);
        assert_eq!(game.parent(fresh), Some(root));
        assert_eq!(game.children(fresh)[0], right);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_delete_move() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let [left, right] = [game.children(root)[0], game.children(root)[1]];
        let two = game.add_move(left, decision(2, 2)).unwrap();
        game.add_move(right, MoveTarget::Infoset(two)).unwrap();
        let one = game.infoset(root).unwrap();

        let kept = game.delete_move(root, 1).unwrap();
        assert_eq!(kept, right);
        assert_eq!(game.root(), right);
        assert!(!game.contains_node(left));
        assert!(!game.contains_infoset(one));
        assert_eq!(game.num_members(two), 1);
        assert_eq!(game.num_nodes(), 3);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_delete_tree() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let left = game.children(root)[0];
        let two = game.add_move(left, decision(2, 2)).unwrap();
        let outcome = game.new_outcome(vec![1.0, 2.0]).unwrap();
        game.set_outcome(left, Some(outcome)).unwrap();

        game.delete_tree(left).unwrap();
        assert!(game.is_terminal(left));
        assert_eq!(game.outcome(left), Some(outcome));
        assert!(!game.contains_infoset(two));
        assert_eq!(game.num_nodes(), 3);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_delete_empty_infosets() {
        let mut game = Efg::<f64>::new(["one"]);
        let spare = game.create_infoset(PlayerId::new(1), 2).unwrap();
        let used = game.add_move(game.root(), decision(1, 2)).unwrap();
        assert_eq!(game.delete_empty_infosets(), 1);
        assert!(!game.contains_infoset(spare));
        assert!(game.contains_infoset(used));
        assert_eq!(game.delete_empty_infosets(), 0);
    }

    #[test]
    fn test_copy_tree_shares_infosets() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let [left, right] = [game.children(root)[0], game.children(root)[1]];
        let two = game.add_move(left, decision(2, 2)).unwrap();
        let outcome = game.new_outcome(vec![1.0, -1.0]).unwrap();
        let leaf = game.children(left)[1];
        game.set_outcome(leaf, Some(outcome)).unwrap();

        game.copy_tree(left, right).unwrap();
        assert_eq!(game.infoset(right), Some(two));
        assert_eq!(game.num_members(two), 2);
        assert_eq!(game.outcome(game.children(right)[1]), Some(outcome));
        assert_eq!(game.num_nodes(), 7);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_copy_tree_into_itself() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game.add_move(root, decision(1, 2)).unwrap();
        let leaf = game.children(root)[0];

        game.copy_tree(root, leaf).unwrap();
        assert_eq!(game.infoset(leaf), Some(infoset));
        assert_eq!(game.num_members(infoset), 2);
        assert_eq!(game.num_nodes(), 5);
        assert!(game.children(leaf).iter().all(|c| game.is_terminal(*c)));
        assert!(game.is_consistent());
    }

    #[test]
    fn test_copy_tree_over_ancestor() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let left = game.children(root)[0];
        let two = game.add_move(left, decision(2, 3)).unwrap();
        let deep = game.children(left)[2];
        let three = game.add_move(deep, decision(1, 2)).unwrap();

        game.copy_tree(deep, root).unwrap();
        assert_eq!(game.infoset(root), Some(three));
        assert!(!game.contains_node(deep));
        assert!(!game.contains_infoset(two));
        assert_eq!(game.num_members(three), 1);
        assert_eq!(game.num_nodes(), 3);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_move_tree() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let [left, right] = [game.children(root)[0], game.children(root)[1]];
        let two = game.add_move(left, decision(2, 2)).unwrap();
        let grandchild = game.children(left)[0];

        game.move_tree(left, right).unwrap();
        assert!(game.is_terminal(left));
        assert_eq!(game.infoset(right), Some(two));
        assert_eq!(game.parent(grandchild), Some(right));
        assert_eq!(game.members(two).collect::<Vec<_>>(), [right]);
        assert_eq!(game.num_nodes(), 5);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_merge_and_split() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let [left, right] = [game.children(root)[0], game.children(root)[1]];
        let a = game.add_move(left, decision(2, 2)).unwrap();
        let b = game.add_move(right, decision(2, 2)).unwrap();
        game.set_action_label(a, 0, "heads").unwrap();

        game.merge_infosets(a, b).unwrap();
        assert!(!game.contains_infoset(b));
        assert_eq!(game.infoset(right), Some(a));
        assert_eq!(game.num_members(a), 2);

        let c = game.split_infoset(right).unwrap();
        assert_ne!(c, a);
        assert_eq!(game.num_members(a), 1);
        assert_eq!(game.num_members(c), 1);
        assert_eq!(game.action_label(c, 0), "heads");
        assert_eq!(game.infoset_player(c), PlayerId::new(2));
        assert_eq!(game.split_infoset(right).unwrap(), c);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_join_infoset() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let [left, right] = [game.children(root)[0], game.children(root)[1]];
        let a = game.add_move(left, decision(2, 2)).unwrap();
        let b = game.add_move(right, decision(2, 2)).unwrap();
        game.join_infoset(right, a).unwrap();
        assert!(!game.contains_infoset(b));
        assert_eq!(game.num_members(a), 2);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_delete_action() {
        let mut game = Efg::<f64>::new(["one", "two"]);
        let root = game.root();
        let one = game.add_move(root, decision(1, 3)).unwrap();
        let [left, mid] = [game.children(root)[0], game.children(root)[1]];
        let two = game.add_move(mid, decision(2, 2)).unwrap();

        game.delete_action(one, 1).unwrap();
        assert_eq!(game.num_actions(one), 2);
        assert_eq!(game.num_children(root), 2);
        assert_eq!(game.children(root)[0], left);
        assert!(!game.contains_node(mid));
        assert!(!game.contains_infoset(two));
        assert!(game.is_consistent());
    }

    #[test]
    fn test_delete_action_nested_members() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game.add_move(root, decision(1, 2)).unwrap();
        let left = game.children(root)[0];
        game.add_move(left, MoveTarget::Infoset(infoset)).unwrap();

        game.delete_action(infoset, 0).unwrap();
        assert!(!game.contains_node(left));
        assert_eq!(game.num_members(infoset), 1);
        assert_eq!(game.num_nodes(), 2);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_delete_chance_action_renormalizes() {
        let mut game = Efg::<Rational>::new(["one"]);
        let chance = game
            .add_move(
                game.root(),
                MoveTarget::New {
                    player: PlayerId::CHANCE,
                    actions: 3,
                },
            )
            .unwrap();
        game.set_chance_probs(
            chance,
            vec![Rational::new(1, 2), Rational::new(1, 4), Rational::new(1, 4)],
        )
        .unwrap();
        game.delete_action(chance, 0).unwrap();
        assert_eq!(game.action_prob(chance, 0), Some(&Rational::new(1, 2)));
        assert_eq!(game.action_prob(chance, 1), Some(&Rational::new(1, 2)));
    }

    #[test]
    fn test_insert_action() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game.add_move(root, decision(1, 2)).unwrap();
        let right = game.children(root)[1];
        game.add_move(right, MoveTarget::Infoset(infoset)).unwrap();

        game.insert_action(infoset, 1).unwrap();
        assert_eq!(game.num_actions(infoset), 3);
        assert_eq!(game.num_children(root), 3);
        assert_eq!(game.children(root)[2], right);
        assert_eq!(game.num_children(right), 3);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_outcomes() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        game.add_move(root, decision(1, 2)).unwrap();
        let outcome = game.new_outcome(vec![3.0]).unwrap();
        for child in game.children(root).to_vec() {
            game.set_outcome(child, Some(outcome)).unwrap();
        }
        game.set_payoff(outcome, PlayerId::new(1), 4.0).unwrap();
        assert_eq!(game.payoff(outcome, PlayerId::new(1)), &4.0);

        let two = game.new_player("two");
        assert_eq!(two, PlayerId::new(2));
        assert_eq!(game.payoffs(outcome), [4.0, 0.0]);

        game.delete_outcome(outcome).unwrap();
        assert!(game.children(root).iter().all(|c| game.outcome(*c).is_none()));
        assert_eq!(game.outcomes().len(), 0);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_labels_keep_revision() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game.add_move(root, decision(1, 2)).unwrap();
        let revision = game.revision();
        game.set_node_label(root, "start").unwrap();
        game.set_infoset_label(infoset, "only").unwrap();
        game.set_player_label(PlayerId::new(1), "first").unwrap();
        assert_eq!(game.revision(), revision);
        assert_eq!(game.node_label(root), "start");
        assert_eq!(game.infoset_label(infoset), "only");
        assert_eq!(game.player_label(PlayerId::new(1)), "first");
    }

    #[test]
    fn test_failure_leaves_game_untouched() {
        let mut game = Efg::<f64>::new(["one"]);
        let root = game.root();
        let infoset = game.add_move(root, decision(1, 1)).unwrap();
        let revision = game.revision();
        let nodes = game.num_nodes();
        assert!(game.delete_action(infoset, 0).is_err());
        assert!(game.add_move(root, decision(1, 2)).is_err());
        assert!(game.move_tree(root, game.children(root)[0]).is_err());
        assert_eq!(game.revision(), revision);
        assert_eq!(game.num_nodes(), nodes);
        assert!(game.is_consistent());
    }
}
