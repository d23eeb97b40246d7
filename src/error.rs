#[cfg(doc)]
use crate::{Contingency, Efg, NormalForm, Strategy, Support};
use thiserror::Error;

/// Errors that result from editing a game tree
///
/// Every mutation of an [Efg] validates its arguments before touching the tree, so when one of
/// these is returned the game is exactly as it was before the call.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum GameError {
    /// Returned when a node handle was destroyed or belongs to another game
    #[error("node does not belong to this game")]
    InvalidNode,
    /// Returned when an infoset handle was destroyed or belongs to another game
    #[error("information set does not belong to this game")]
    InvalidInfoset,
    /// Returned when an outcome handle was deleted or belongs to another game
    #[error("outcome does not belong to this game")]
    InvalidOutcome,
    /// Returned when a player id is out of range, or chance was given where a personal player is
    /// required
    #[error("no such player")]
    InvalidPlayer,
    /// Returned when a move is added to a node that already has one
    #[error("node already has a move")]
    NotTerminal,
    /// Returned when an operation needs a decision node but was given a terminal node
    #[error("node is terminal")]
    Terminal,
    /// Returned when a move would have no actions
    #[error("a move needs at least one action")]
    NoActions,
    /// Returned when an action or child index is past the end of an infoset's actions
    #[error("action index out of range")]
    ActionOutOfRange,
    /// Returned when deleting the only action of an infoset
    ///
    /// Every decision node needs at least one child, so the last action can't go. Use
    /// [Efg::delete_move] or [Efg::delete_tree] on the members instead.
    #[error("can't delete the last action of an information set")]
    LastAction,
    /// Returned when two infosets, or a node and an infoset, don't have the same number of actions
    #[error("information sets have different numbers of actions")]
    ActionsNotEqual,
    /// Returned when marking a subgame whose subtree is straddled by an information set
    #[error("node is not the root of a legal subgame")]
    IllegalSubgame,
    /// Returned when unmarking the root of the game, which is always a subgame root
    #[error("the root of the game is always a subgame root")]
    RootSubgame,
    /// Returned when copying or moving a subtree onto itself
    #[error("source and destination are the same node")]
    SameNode,
    /// Returned when moving a subtree into itself, or over a subtree that contains it
    #[error("source and destination subtrees overlap")]
    OverlappingTrees,
    /// Returned when a payoff vector doesn't have one entry per personal player
    #[error("payoff vector length doesn't match the number of players")]
    PayoffsNotEqual,
    /// Returned when setting probabilities on an infoset that isn't owned by chance
    #[error("information set is not a chance information set")]
    NotChance,
    /// Returned when chance probabilities are negative or have the wrong length
    #[error("invalid chance probabilities")]
    InvalidProbability,
}

#[cfg(test)]
mod game_errors {
    use crate::{Efg, GameError, MoveTarget, PlayerId};

    fn create_game() -> Efg<f64> {
        let mut game = Efg::new(["one", "two"]);
        let root = game.root();
        game.add_move(
            root,
            MoveTarget::New {
                player: PlayerId::new(1),
                actions: 2,
            },
        )
        .unwrap();
        game
    }

    #[test]
    fn invalid_node() {
        let mut game = create_game();
        let other = Efg::<f64>::new(["one"]);
        let err = game.delete_tree(other.root()).unwrap_err();
        assert_eq!(err, GameError::InvalidNode);

        let leaf = game.children(game.root())[0];
        game.delete_tree(game.root()).unwrap();
        let err = game.delete_tree(leaf).unwrap_err();
        assert_eq!(err, GameError::InvalidNode);
    }

    #[test]
    fn invalid_infoset() {
        let mut game = create_game();
        let root = game.root();
        let infoset = game.infoset(root).unwrap();
        game.delete_tree(root).unwrap();
        let err = game
            .add_move(root, MoveTarget::Infoset(infoset))
            .unwrap_err();
        assert_eq!(err, GameError::InvalidInfoset);
    }

    #[test]
    fn invalid_outcome() {
        let mut game = create_game();
        let outcome = game.new_outcome(vec![1.0, -1.0]).unwrap();
        game.delete_outcome(outcome).unwrap();
        let err = game.set_outcome(game.root(), Some(outcome)).unwrap_err();
        assert_eq!(err, GameError::InvalidOutcome);
    }

    #[test]
    fn invalid_player() {
        let mut game = create_game();
        let leaf = game.children(game.root())[0];
        let err = game
            .add_move(
                leaf,
                MoveTarget::New {
                    player: PlayerId::new(3),
                    actions: 2,
                },
            )
            .unwrap_err();
        assert_eq!(err, GameError::InvalidPlayer);

        let outcome = game.new_outcome(vec![0.0, 0.0]).unwrap();
        let err = game.set_payoff(outcome, PlayerId::CHANCE, 1.0).unwrap_err();
        assert_eq!(err, GameError::InvalidPlayer);
    }

    #[test]
    fn not_terminal() {
        let mut game = create_game();
        let root = game.root();
        let err = game
            .add_move(
                root,
                MoveTarget::New {
                    player: PlayerId::new(2),
                    actions: 2,
                },
            )
            .unwrap_err();
        assert_eq!(err, GameError::NotTerminal);
    }

    #[test]
    fn terminal() {
        let mut game = create_game();
        let leaf = game.children(game.root())[1];
        assert_eq!(game.delete_move(leaf, 0).unwrap_err(), GameError::Terminal);
        assert_eq!(game.split_infoset(leaf).unwrap_err(), GameError::Terminal);
    }

    #[test]
    fn no_actions() {
        let mut game = create_game();
        let leaf = game.children(game.root())[0];
        let err = game
            .add_move(
                leaf,
                MoveTarget::New {
                    player: PlayerId::new(2),
                    actions: 0,
                },
            )
            .unwrap_err();
        assert_eq!(err, GameError::NoActions);
    }

    #[test]
    fn action_out_of_range() {
        let mut game = create_game();
        let root = game.root();
        let infoset = game.infoset(root).unwrap();
        assert_eq!(
            game.delete_move(root, 2).unwrap_err(),
            GameError::ActionOutOfRange
        );
        assert_eq!(
            game.delete_action(infoset, 5).unwrap_err(),
            GameError::ActionOutOfRange
        );
    }

    #[test]
    fn last_action() {
        let mut game = create_game();
        let infoset = game.infoset(game.root()).unwrap();
        game.delete_action(infoset, 0).unwrap();
        let err = game.delete_action(infoset, 0).unwrap_err();
        assert_eq!(err, GameError::LastAction);
        assert_eq!(game.num_actions(infoset), 1);
    }

    #[test]
    fn actions_not_equal() {
        let mut game = create_game();
        let root = game.root();
        let leaf = game.children(root)[0];
        let other = game
            .add_move(
                leaf,
                MoveTarget::New {
                    player: PlayerId::new(1),
                    actions: 3,
                },
            )
            .unwrap();
        let infoset = game.infoset(root).unwrap();
        let err = game.merge_infosets(infoset, other).unwrap_err();
        assert_eq!(err, GameError::ActionsNotEqual);
    }

    #[test]
    fn illegal_subgame() {
        let mut game = create_game();
        let root = game.root();
        let [left, right] = [game.children(root)[0], game.children(root)[1]];
        let infoset = game
            .add_move(
                left,
                MoveTarget::New {
                    player: PlayerId::new(2),
                    actions: 2,
                },
            )
            .unwrap();
        game.add_move(right, MoveTarget::Infoset(infoset)).unwrap();
        let err = game.mark_subgame(left).unwrap_err();
        assert_eq!(err, GameError::IllegalSubgame);
        assert!(!game.is_subgame_root(left));
    }

    #[test]
    fn root_subgame() {
        let mut game = create_game();
        let err = game.unmark_subgame(game.root()).unwrap_err();
        assert_eq!(err, GameError::RootSubgame);
    }

    #[test]
    fn same_node() {
        let mut game = create_game();
        let root = game.root();
        assert_eq!(game.copy_tree(root, root).unwrap_err(), GameError::SameNode);
        assert_eq!(game.move_tree(root, root).unwrap_err(), GameError::SameNode);
    }

    #[test]
    fn overlapping_trees() {
        let mut game = create_game();
        let root = game.root();
        let leaf = game.children(root)[0];
        assert_eq!(
            game.move_tree(root, leaf).unwrap_err(),
            GameError::OverlappingTrees
        );
        assert_eq!(
            game.move_tree(leaf, root).unwrap_err(),
            GameError::OverlappingTrees
        );
    }

    #[test]
    fn payoffs_not_equal() {
        let mut game = create_game();
        let err = game.new_outcome(vec![1.0]).unwrap_err();
        assert_eq!(err, GameError::PayoffsNotEqual);
    }

    #[test]
    fn not_chance() {
        let mut game = create_game();
        let infoset = game.infoset(game.root()).unwrap();
        let err = game.set_chance_probs(infoset, vec![0.5, 0.5]).unwrap_err();
        assert_eq!(err, GameError::NotChance);
    }

    #[test]
    fn invalid_probability() {
        let mut game = create_game();
        let leaf = game.children(game.root())[0];
        let infoset = game
            .add_move(
                leaf,
                MoveTarget::New {
                    player: PlayerId::CHANCE,
                    actions: 2,
                },
            )
            .unwrap();
        let err = game.set_chance_probs(infoset, vec![1.5, -0.5]).unwrap_err();
        assert_eq!(err, GameError::InvalidProbability);
        let err = game.set_chance_probs(infoset, vec![1.0]).unwrap_err();
        assert_eq!(err, GameError::InvalidProbability);
    }
}

/// Errors that result from using the normal form of a game
///
/// These are returned when a [Strategy], [Contingency] or [Support] is used with a [NormalForm]
/// it wasn't created from, or when a request doesn't fit the shape of the strategy space.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum NormalFormError {
    /// Returned when a strategy, contingency or support came from a different normal form
    #[error("profile belongs to a different normal form")]
    ForeignProfile,
    /// Returned when a player id is chance or out of range
    #[error("no such personal player")]
    InvalidPlayer,
    /// Returned when a strategy index is past the player's number of strategies
    #[error("strategy index out of range")]
    StrategyOutOfRange,
    /// Returned when asking for the payoff of a contingency with an unassigned player
    #[error("contingency doesn't assign a strategy to every player")]
    IncompleteContingency,
    /// Returned when decoding a flattened index that is past the number of contingencies
    #[error("contingency index out of range")]
    IndexOutOfRange,
    /// Returned when an operation needs the source game after the normal form was detached
    #[error("normal form is detached from its extensive form")]
    Detached,
    /// Returned when reading stored outcomes of a normal form that traces its payoffs
    #[error("normal form has no payoff table")]
    NotMaterialized,
    /// Returned when the number of strategies or contingencies doesn't fit in a machine word
    #[error("too many contingencies")]
    TooManyContingencies,
    /// Returned when a payoff vector doesn't have one entry per player
    #[error("payoff vector length doesn't match the number of players")]
    PayoffsNotEqual,
}

#[cfg(test)]
mod normal_form_errors {
    use crate::{Efg, MoveTarget, NormalForm, NormalFormError, PlayerId};

    fn create_game() -> Efg<f64> {
        let mut game = Efg::new(["one", "two"]);
        let root = game.root();
        game.add_move(
            root,
            MoveTarget::New {
                player: PlayerId::new(1),
                actions: 2,
            },
        )
        .unwrap();
        game
    }

    #[test]
    fn foreign_profile() {
        let game = create_game();
        let one = NormalForm::new(&game).unwrap();
        let two = NormalForm::new(&game).unwrap();
        let strat = one.strategy(PlayerId::new(1), 0).unwrap();
        let mut support = two.support();
        assert_eq!(
            support.remove_strategy(strat).unwrap_err(),
            NormalFormError::ForeignProfile
        );
        assert_eq!(
            two.payoffs(&one.contingency()).unwrap_err(),
            NormalFormError::ForeignProfile
        );
        assert_eq!(
            two.contingencies(&one.support()).unwrap_err(),
            NormalFormError::ForeignProfile
        );
    }

    #[test]
    fn invalid_player() {
        let game = create_game();
        let nf = NormalForm::new(&game).unwrap();
        assert_eq!(
            nf.num_strategies(PlayerId::CHANCE).unwrap_err(),
            NormalFormError::InvalidPlayer
        );
        assert_eq!(
            nf.strategy(PlayerId::new(3), 0).unwrap_err(),
            NormalFormError::InvalidPlayer
        );
    }

    #[test]
    fn strategy_out_of_range() {
        let game = create_game();
        let nf = NormalForm::new(&game).unwrap();
        assert_eq!(
            nf.strategy(PlayerId::new(1), 2).unwrap_err(),
            NormalFormError::StrategyOutOfRange
        );
    }

    #[test]
    fn incomplete_contingency() {
        let game = create_game();
        let nf = NormalForm::new(&game).unwrap();
        let err = nf.payoffs(&nf.blank_contingency()).unwrap_err();
        assert_eq!(err, NormalFormError::IncompleteContingency);
    }

    #[test]
    fn index_out_of_range() {
        let game = create_game();
        let nf = NormalForm::new(&game).unwrap();
        assert_eq!(nf.decode(2).unwrap_err(), NormalFormError::IndexOutOfRange);
    }

    #[test]
    fn detached() {
        let mut game = create_game();
        let mut nf = NormalForm::new(&game).unwrap();
        nf.break_link();
        assert_eq!(nf.materialize().unwrap_err(), NormalFormError::Detached);
        let leaf = game.children(game.root())[0];
        game.delete_tree(leaf).unwrap();
        assert_eq!(nf.refresh(&game).unwrap_err(), NormalFormError::Detached);
    }

    #[test]
    fn not_materialized() {
        let game = create_game();
        let mut nf = NormalForm::new(&game).unwrap();
        let cont = nf.contingency();
        assert_eq!(nf.outcome(&cont).unwrap_err(), NormalFormError::NotMaterialized);
        nf.materialize().unwrap();
        assert!(nf.outcome(&cont).unwrap().is_some());
    }

    #[test]
    fn too_many_contingencies() {
        let mut game = Efg::<f64>::new(["one"]);
        let mut node = game.root();
        for _ in 0..70 {
            game.add_move(
                node,
                MoveTarget::New {
                    player: PlayerId::new(1),
                    actions: 2,
                },
            )
            .unwrap();
            node = game.children(node)[0];
        }
        let err = NormalForm::new(&game).unwrap_err();
        assert_eq!(err, NormalFormError::TooManyContingencies);
    }

    #[test]
    fn payoffs_not_equal() {
        let game = create_game();
        let mut nf = NormalForm::new(&game).unwrap();
        let cont = nf.contingency();
        let err = nf.set_outcome(&cont, Some(vec![1.0])).unwrap_err();
        assert_eq!(err, NormalFormError::PayoffsNotEqual);
        assert!(nf.is_linked());
    }
}
