//! The extensive form of a game
//!
//! An [Efg] owns every node, information set, player and outcome of one game. Entities are
//! stored in generation checked arenas and referred to by copyable handles ([NodeId],
//! [InfosetId], [OutcomeId], [PlayerId]), so there are no owning pointers between them: a node's
//! parent, its information set and its outcome are all just handle lookups.
//!
//! Read accessors take handles that are expected to be live and panic otherwise, the same way
//! indexing a slice does. Every mutation (see the `edit` and `subgame` methods) instead validates
//! its handles and returns a [GameError](crate::GameError) without changing anything when they
//! are stale or belong to a different game.
mod check;
mod edit;
mod subgame;

use crate::arena::{self, Arena, Key};
use crate::payoff::{self, Payoff};
use indexmap::IndexSet;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

fn fresh_instance() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// A handle to a node of an [Efg]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Key);

/// A handle to an information set of an [Efg]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfosetId(Key);

/// A handle to an outcome of an [Efg]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutcomeId(Key);

/// A player of a game
///
/// Players are numbered from one in the order they were added. Player zero is reserved for
/// chance, whose information sets carry fixed action probabilities instead of decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(usize);

impl PlayerId {
    /// The chance player
    pub const CHANCE: PlayerId = PlayerId(0);

    /// Refer to the player with a given number
    ///
    /// The number isn't checked until the id is used with a game.
    pub const fn new(index: usize) -> Self {
        PlayerId(index)
    }

    /// The number of this player, zero for chance
    pub const fn index(self) -> usize {
        self.0
    }

    /// True if this is the chance player
    pub const fn is_chance(self) -> bool {
        self.0 == 0
    }
}

/// What happens at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The game is over
    Terminal,
    /// Nature picks a child with the probabilities of the node's information set
    Chance,
    /// The given player picks a child
    Decision(PlayerId),
}

/// The information set a new move should belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveTarget {
    /// Join an existing information set
    Infoset(InfosetId),
    /// Create a fresh information set for `player` with `actions` actions
    ///
    /// Chance information sets start with uniform probabilities.
    New {
        /// The player who moves
        player: PlayerId,
        /// The number of actions, which must be positive
        actions: usize,
    },
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    infoset: Option<InfosetId>,
    outcome: Option<OutcomeId>,
    subgame: bool,
}

#[derive(Debug, Clone)]
struct ActionData<T> {
    label: String,
    // only set for chance
    prob: Option<T>,
}

#[derive(Debug, Clone)]
struct InfosetData<T> {
    player: PlayerId,
    label: String,
    actions: Vec<ActionData<T>>,
    members: IndexSet<NodeId>,
}

impl<T: Payoff> InfosetData<T> {
    fn new(player: PlayerId, num_actions: usize) -> Self {
        let actions = (0..num_actions)
            .map(|_| ActionData {
                label: String::new(),
                prob: player
                    .is_chance()
                    .then(|| payoff::uniform(num_actions)),
            })
            .collect();
        InfosetData {
            player,
            label: String::new(),
            actions,
            members: IndexSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct PlayerData {
    label: String,
    infosets: Vec<InfosetId>,
}

#[derive(Debug, Clone)]
struct OutcomeData<T> {
    label: String,
    payoffs: Vec<T>,
}

/// An extensive form game
///
/// The game starts as a single terminal root and is grown with the mutation methods, e.g.
/// [Efg::add_move]. Every mutation that can change the strategic structure or payoffs of the game
/// advances [Efg::revision], which dependent views such as a
/// [NormalForm](crate::NormalForm) use to notice they're stale.
///
/// Cloning a game produces an identical snapshot; handles from the original remain valid on the
/// clone. A clone still counts as a separate game for
/// [NormalForm::is_current](crate::NormalForm::is_current): a normal form derived from one is
/// never current for the other, however the two are edited afterwards.
#[derive(Debug)]
pub struct Efg<T> {
    tag: u32,
    instance: u64,
    root: NodeId,
    nodes: Arena<NodeData>,
    infosets: Arena<InfosetData<T>>,
    outcomes: Arena<OutcomeData<T>>,
    players: Vec<PlayerData>,
    revision: u64,
}

impl<T: Clone> Clone for Efg<T> {
    fn clone(&self) -> Self {
        Efg {
            tag: self.tag,
            instance: fresh_instance(),
            root: self.root,
            nodes: self.nodes.clone(),
            infosets: self.infosets.clone(),
            outcomes: self.outcomes.clone(),
            players: self.players.clone(),
            revision: self.revision,
        }
    }
}

impl<T: Payoff> Efg<T> {
    /// Create a game with the given personal players and a single terminal node
    pub fn new(players: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let tag = arena::fresh_tag();
        let mut nodes = Arena::new(tag);
        let root = NodeId(nodes.insert(NodeData::default()));
        let chance = PlayerData {
            label: String::new(),
            infosets: Vec::new(),
        };
        let players = std::iter::once(chance)
            .chain(players.into_iter().map(|label| PlayerData {
                label: label.into(),
                infosets: Vec::new(),
            }))
            .collect();
        Efg {
            tag,
            instance: fresh_instance(),
            root,
            nodes,
            infosets: Arena::new(tag),
            outcomes: Arena::new(tag),
            players,
            revision: 0,
        }
    }

    /// Identifies this particular game value, unlike the arena tag which clones share
    pub(crate) fn instance(&self) -> u64 {
        self.instance
    }

    /// The number of mutations applied so far
    ///
    /// Caches derived from the game should be rebuilt when this changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ----- //
    // Nodes //
    // ----- //

    /// The root of the tree
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The number of nodes in the tree
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// True if the node is live in this game
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    /// Iterate over all nodes in preorder
    pub fn nodes(&self) -> Subtree<'_, T> {
        self.subtree(self.root)
    }

    /// Iterate over `node` and its descendants in preorder
    ///
    /// # Panics
    ///
    /// If `node` isn't live in this game.
    pub fn subtree(&self, node: NodeId) -> Subtree<'_, T> {
        assert!(self.contains_node(node), "{node:?} isn't part of this game");
        Subtree {
            game: self,
            stack: vec![node],
        }
    }

    /// Iterate over the terminal nodes from left to right
    pub fn terminals(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter(|node| self.is_terminal(*node))
    }

    /// The label of a node
    pub fn node_label(&self, node: NodeId) -> &str {
        &self.nodes[node.0].label
    }

    /// The parent of a node, `None` for the root
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// The children of a node, one per action of its information set
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// The number of children of a node
    pub fn num_children(&self, node: NodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    /// The child reached by taking `action` at `node`
    pub fn child(&self, node: NodeId, action: usize) -> Option<NodeId> {
        self.nodes[node.0].children.get(action).copied()
    }

    /// The index of the action that leads from the parent to this node
    pub fn prior_action(&self, node: NodeId) -> Option<usize> {
        let parent = self.nodes[node.0].parent?;
        self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == node)
    }

    /// The sibling reached by the next action of the parent
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let ind = self.prior_action(node)?;
        self.child(parent, ind + 1)
    }

    /// The sibling reached by the previous action of the parent
    pub fn prior_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let ind = self.prior_action(node)?;
        ind.checked_sub(1).and_then(|prev| self.child(parent, prev))
    }

    /// The information set of a node, `None` for terminal nodes
    pub fn infoset(&self, node: NodeId) -> Option<InfosetId> {
        self.nodes[node.0].infoset
    }

    /// The outcome attached to a node
    pub fn outcome(&self, node: NodeId) -> Option<OutcomeId> {
        self.nodes[node.0].outcome
    }

    /// True if the node has no move
    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes[node.0].infoset.is_none()
    }

    /// The player moving at a node, `None` for terminal nodes
    pub fn player(&self, node: NodeId) -> Option<PlayerId> {
        self.infoset(node).map(|infoset| self.infosets[infoset.0].player)
    }

    /// What kind of node this is
    pub fn kind(&self, node: NodeId) -> NodeKind {
        match self.player(node) {
            None => NodeKind::Terminal,
            Some(player) if player.is_chance() => NodeKind::Chance,
            Some(player) => NodeKind::Decision(player),
        }
    }

    /// True if `node` lies in the subtree rooted at `ancestor`
    ///
    /// Every node is its own ancestor.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.nodes[next.0].parent;
        }
        false
    }

    /// The member of the node's information set listed before it
    pub fn prior_member(&self, node: NodeId) -> Option<NodeId> {
        let members = &self.infosets[self.infoset(node)?.0].members;
        let ind = members.get_index_of(&node)?;
        ind.checked_sub(1)
            .and_then(|prev| members.get_index(prev))
            .copied()
    }

    /// The member of the node's information set listed after it
    pub fn next_member(&self, node: NodeId) -> Option<NodeId> {
        let members = &self.infosets[self.infoset(node)?.0].members;
        let ind = members.get_index_of(&node)?;
        members.get_index(ind + 1).copied()
    }

    // -------- //
    // Infosets //
    // -------- //

    /// True if the information set is live in this game
    pub fn contains_infoset(&self, infoset: InfosetId) -> bool {
        self.infosets.contains(infoset.0)
    }

    /// Iterate over every information set, grouped by player starting with chance
    pub fn infosets(&self) -> impl Iterator<Item = InfosetId> + '_ {
        self.players
            .iter()
            .flat_map(|player| player.infosets.iter().copied())
    }

    /// The player who owns an information set
    pub fn infoset_player(&self, infoset: InfosetId) -> PlayerId {
        self.infosets[infoset.0].player
    }

    /// The label of an information set
    pub fn infoset_label(&self, infoset: InfosetId) -> &str {
        &self.infosets[infoset.0].label
    }

    /// The number of actions of an information set
    pub fn num_actions(&self, infoset: InfosetId) -> usize {
        self.infosets[infoset.0].actions.len()
    }

    /// The label of an action
    ///
    /// # Panics
    ///
    /// If the information set isn't live or the action is out of range.
    pub fn action_label(&self, infoset: InfosetId, action: usize) -> &str {
        &self.infosets[infoset.0].actions[action].label
    }

    /// The probability of a chance action, `None` for personal information sets
    pub fn action_prob(&self, infoset: InfosetId, action: usize) -> Option<&T> {
        self.infosets[infoset.0].actions[action].prob.as_ref()
    }

    /// The members of an information set in the order they joined
    pub fn members(&self, infoset: InfosetId) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.infosets[infoset.0].members.iter().copied()
    }

    /// The number of members of an information set
    pub fn num_members(&self, infoset: InfosetId) -> usize {
        self.infosets[infoset.0].members.len()
    }

    // ------- //
    // Players //
    // ------- //

    /// The number of personal players, excluding chance
    pub fn num_players(&self) -> usize {
        self.players.len() - 1
    }

    /// Iterate over the personal players
    pub fn players(&self) -> impl ExactSizeIterator<Item = PlayerId> {
        (1..self.players.len()).map(PlayerId)
    }

    /// The label of a player
    pub fn player_label(&self, player: PlayerId) -> &str {
        &self.players[player.0].label
    }

    /// The information sets of a player in creation order
    pub fn player_infosets(&self, player: PlayerId) -> &[InfosetId] {
        &self.players[player.0].infosets
    }

    // -------- //
    // Outcomes //
    // -------- //

    /// True if the outcome is live in this game
    pub fn contains_outcome(&self, outcome: OutcomeId) -> bool {
        self.outcomes.contains(outcome.0)
    }

    /// Iterate over all outcomes
    pub fn outcomes(&self) -> impl ExactSizeIterator<Item = OutcomeId> + '_ {
        self.outcomes.iter().map(|(key, _)| OutcomeId(key))
    }

    /// The label of an outcome
    pub fn outcome_label(&self, outcome: OutcomeId) -> &str {
        &self.outcomes[outcome.0].label
    }

    /// The payoffs of an outcome, one per personal player
    pub fn payoffs(&self, outcome: OutcomeId) -> &[T] {
        &self.outcomes[outcome.0].payoffs
    }

    /// The payoff of an outcome to a personal player
    ///
    /// # Panics
    ///
    /// If the outcome isn't live or the player is chance or out of range.
    pub fn payoff(&self, outcome: OutcomeId, player: PlayerId) -> &T {
        assert!(!player.is_chance(), "chance has no payoffs");
        &self.outcomes[outcome.0].payoffs[player.0 - 1]
    }
}

/// A preorder iterator over a subtree
///
/// Returned by [Efg::nodes] and [Efg::subtree].
#[derive(Debug, Clone)]
pub struct Subtree<'a, T> {
    game: &'a Efg<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for Subtree<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.game.nodes[node.0].children.iter().rev().copied());
        Some(node)
    }
}

impl<T> FusedIterator for Subtree<'_, T> {}
