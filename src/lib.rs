//! Editable extensive-form games and their normal form.
//!
//! An [extensive form game](https://en.wikipedia.org/wiki/Extensive-form_game) is a tree whose
//! internal nodes are moves, either decisions of a player or random moves of chance, and whose
//! nodes can carry outcomes with a payoff for every player. Decision nodes a player can't tell
//! apart are grouped in information sets, and the player must act the same way at every node of
//! one set.
//!
//! # Usage
//!
//! Create an [Efg] with its players, then grow and reshape the tree with its mutation methods,
//! e.g. [Efg::add_move], [Efg::merge_infosets] or [Efg::copy_tree]. Every mutation checks its
//! arguments first and returns a [GameError] without touching the game if they're invalid, so the
//! game is always well formed.
//!
//! A [NormalForm] derived from a game enumerates the pure [Strategy]s of every player and the
//! payoffs of every [Contingency] of them, optionally restricted to a [Support].
//!
//! # Examples
//!
//! Matching pennies, where player two can't see the coin player one picked:
//! ```
//! use efg::{Efg, MoveTarget, NormalForm, PlayerId};
//!
//! let mut game = Efg::<f64>::new(["one", "two"]);
//! let root = game.root();
//! game.add_move(root, MoveTarget::New { player: PlayerId::new(1), actions: 2 })?;
//! let [heads, tails] = [game.children(root)[0], game.children(root)[1]];
//! let guess = game.add_move(heads, MoveTarget::New { player: PlayerId::new(2), actions: 2 })?;
//! game.add_move(tails, MoveTarget::Infoset(guess))?;
//! for (ind, node) in game.terminals().collect::<Vec<_>>().into_iter().enumerate() {
//!     let win = if ind == 0 || ind == 3 { 1.0 } else { 0.0 };
//!     let outcome = game.new_outcome(vec![win, 1.0 - win])?;
//!     game.set_outcome(node, Some(outcome))?;
//! }
//!
//! let nf = NormalForm::new(&game)?;
//! let payoffs: Vec<_> = nf
//!     .contingencies(&nf.support())?
//!     .map(|cont| nf.payoffs(&cont))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(payoffs, [[1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [1.0, 0.0]]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![warn(missing_docs)]
mod arena;
mod efg;
mod error;
mod nfg;
mod payoff;

pub use crate::efg::{Efg, InfosetId, MoveTarget, NodeId, NodeKind, OutcomeId, PlayerId, Subtree};
pub use error::{GameError, NormalFormError};
pub use nfg::{Contingencies, Contingency, NormalForm, Strategy, Support};
pub use payoff::{Payoff, Rational};
