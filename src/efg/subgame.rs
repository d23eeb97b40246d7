//! Subgame root markers
use super::{Efg, InfosetId, NodeId};
use crate::payoff::Payoff;
use crate::GameError;
use log::{debug, trace};
use std::collections::HashMap;

impl<T: Payoff> Efg<T> {
    /// True if the subtree at `node` could be played as a game of its own
    ///
    /// This requires `node` to have a move and every information set with a member in its subtree
    /// to have all of its members there.
    pub fn is_legal_subgame(&self, node: NodeId) -> bool {
        if self.is_terminal(node) {
            return false;
        }
        let mut counts = HashMap::<InfosetId, usize>::new();
        for member in self.subtree(node) {
            if let Some(infoset) = self.infoset(member) {
                *counts.entry(infoset).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .all(|(infoset, count)| count == self.num_members(infoset))
    }

    /// True if `node` is the root of the game or marked as a subgame root
    pub fn is_subgame_root(&self, node: NodeId) -> bool {
        node == self.root || self.nodes[node.0].subgame
    }

    /// The root of the smallest marked subgame containing `node`
    pub fn subgame_root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while !self.is_subgame_root(current) {
            // only the root has no parent, and it always counts
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Every node that could be marked as a subgame root, in preorder
    pub fn legal_subgame_roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|node| self.is_legal_subgame(*node))
            .collect()
    }

    /// Mark a node as the root of a subgame
    ///
    /// Marking the root of the game does nothing, it's always a subgame root.
    pub fn mark_subgame(&mut self, node: NodeId) -> Result<(), GameError> {
        if !self.contains_node(node) {
            Err(GameError::InvalidNode)
        } else if !self.is_legal_subgame(node) {
            Err(GameError::IllegalSubgame)
        } else {
            if !self.is_subgame_root(node) {
                self.nodes[node.0].subgame = true;
                debug!("marked {node:?} as a subgame root");
                self.touch();
            }
            Ok(())
        }
    }

    /// Remove the subgame marker of a node
    pub fn unmark_subgame(&mut self, node: NodeId) -> Result<(), GameError> {
        if !self.contains_node(node) {
            Err(GameError::InvalidNode)
        } else if node == self.root {
            Err(GameError::RootSubgame)
        } else {
            if self.nodes[node.0].subgame {
                self.nodes[node.0].subgame = false;
                debug!("unmarked subgame root {node:?}");
                self.touch();
            }
            Ok(())
        }
    }

    /// Mark several subgame roots at once
    ///
    /// Every node is checked before any is marked.
    pub fn mark_subgames(&mut self, nodes: &[NodeId]) -> Result<(), GameError> {
        for node in nodes {
            if !self.contains_node(*node) {
                return Err(GameError::InvalidNode);
            } else if !self.is_legal_subgame(*node) {
                return Err(GameError::IllegalSubgame);
            }
        }
        let mut changed = false;
        for node in nodes {
            if !self.is_subgame_root(*node) {
                self.nodes[node.0].subgame = true;
                changed = true;
            }
        }
        if changed {
            debug!("marked {} subgame roots", nodes.len());
            self.touch();
        }
        Ok(())
    }

    /// Remove every subgame marker in the subtree at `node`
    ///
    /// The root of the game stays a subgame root.
    pub fn unmark_subgames(&mut self, node: NodeId) -> Result<(), GameError> {
        if !self.contains_node(node) {
            return Err(GameError::InvalidNode);
        }
        let marked: Vec<_> = self
            .subtree(node)
            .filter(|node| self.nodes[node.0].subgame)
            .collect();
        for node in &marked {
            self.nodes[node.0].subgame = false;
        }
        if !marked.is_empty() {
            debug!("unmarked {} subgame roots", marked.len());
            self.touch();
        }
        Ok(())
    }

    /// Clear markers that a structural change made illegal
    pub(super) fn prune_subgames(&mut self) {
        let illegal: Vec<_> = self
            .nodes()
            .filter(|node| self.nodes[node.0].subgame && !self.is_legal_subgame(*node))
            .collect();
        for node in illegal {
            trace!("{node:?} is no longer a legal subgame root");
            self.nodes[node.0].subgame = false;
        }
    }
}
