use efg::{Efg, InfosetId, MoveTarget, NodeId, OutcomeId, PlayerId};
use gambit_parser::{Error, ExtensiveFormGame, Node};
use num_traits::cast::ToPrimitive;
use std::collections::HashMap;
use std::io::Read;

fn to_float<N: ToPrimitive>(num: &N) -> f64 {
    match num.to_f64() {
        Some(val) if val.is_finite() => val,
        _ => panic!(
            "received non-finite payoffs in gambit format; make sure payoffs fit in a double"
        ),
    }
}

/// Gambit numbers outcomes and infosets globally, this maps them to the ids of the game being built
struct Builder {
    game: Efg<f64>,
    // chance infosets are keyed with player zero
    infosets: HashMap<(usize, u64), InfosetId>,
    outcomes: HashMap<u64, OutcomeId>,
}

impl Builder {
    fn new(players: impl IntoIterator<Item = String>) -> Self {
        Builder {
            game: Efg::new(players),
            infosets: HashMap::new(),
            outcomes: HashMap::new(),
        }
    }

    fn set_outcome(&mut self, node: NodeId, outcome: u64, payoffs: Option<Vec<f64>>) {
        if outcome == 0 {
            return;
        }
        let id = match self.outcomes.get(&outcome) {
            Some(id) => *id,
            None => {
                let num = self.game.num_players();
                let id = self
                    .game
                    .new_outcome(payoffs.unwrap_or_else(|| vec![0.0; num]))
                    .expect("gambit outcome doesn't have one payoff per player");
                self.outcomes.insert(outcome, id);
                id
            }
        };
        self.game
            .set_outcome(node, Some(id))
            .expect("internal error: outcome wasn't created in this game");
    }

    /// Give `node` the move of a gambit node, returning whether its infoset was new
    fn add_move(&mut self, node: NodeId, player: usize, infoset: u64, actions: usize) -> bool {
        let key = (player, infoset);
        let (target, fresh) = match self.infosets.get(&key) {
            Some(id) => (MoveTarget::Infoset(*id), false),
            None => (
                MoveTarget::New {
                    player: PlayerId::new(player),
                    actions,
                },
                true,
            ),
        };
        let id = self
            .game
            .add_move(node, target)
            .expect("couldn't add a move to the game : check the player numbers of the gambit file");
        if self.game.num_actions(id) != actions {
            panic!("information set {infoset} of player {player} has nodes with different numbers of actions");
        }
        self.infosets.insert(key, id);
        fresh
    }

    fn build(mut self, root: &Node<'_>) -> Efg<f64> {
        // children are pushed in reverse so nodes are visited in file order
        let mut queue = vec![(root, self.game.root())];
        while let Some((gnode, node)) = queue.pop() {
            match gnode {
                Node::Terminal(terminal) => {
                    let payoffs = terminal.outcome_payoffs().iter().map(to_float).collect();
                    self.set_outcome(node, terminal.outcome(), Some(payoffs));
                }
                Node::Chance(chance) => {
                    let payoffs = chance
                        .outcome_payoffs()
                        .map(|pays| pays.iter().map(to_float).collect());
                    self.set_outcome(node, chance.outcome(), payoffs);
                    let actions = chance.actions();
                    if self.add_move(node, 0, chance.infoset(), actions.len()) {
                        let infoset = self.infosets[&(0, chance.infoset())];
                        let probs = actions.iter().map(|(_, prob, _)| to_float(prob)).collect();
                        self.game
                            .set_chance_probs(infoset, probs)
                            .expect("gambit chance probabilities must be non-negative");
                        for (ind, (name, _, _)) in actions.iter().enumerate() {
                            self.game
                                .set_action_label(infoset, ind, name.to_string())
                                .expect("internal error: action wasn't created in this game");
                        }
                    }
                    let children = self.game.children(node);
                    queue.extend(
                        actions
                            .iter()
                            .zip(children)
                            .rev()
                            .map(|((_, _, next), child)| (next, *child)),
                    );
                }
                Node::Player(player) => {
                    let payoffs = player
                        .outcome_payoffs()
                        .map(|pays| pays.iter().map(to_float).collect());
                    self.set_outcome(node, player.outcome(), payoffs);
                    let actions = player.actions();
                    let num = player.player_num();
                    if self.add_move(node, num, player.infoset(), actions.len()) {
                        let infoset = self.infosets[&(num, player.infoset())];
                        if let Some(name) = player.infoset_name() {
                            self.game
                                .set_infoset_label(infoset, name.to_string())
                                .expect("internal error: infoset wasn't created in this game");
                        }
                        for (ind, (name, _)) in actions.iter().enumerate() {
                            self.game
                                .set_action_label(infoset, ind, name.to_string())
                                .expect("internal error: action wasn't created in this game");
                        }
                    }
                    let children = self.game.children(node);
                    queue.extend(
                        actions
                            .iter()
                            .zip(children)
                            .rev()
                            .map(|((_, next), child)| (next, *child)),
                    );
                }
            }
        }
        self.game
    }
}

/// This returns an error on parsing indicating another format should be tried
pub fn from_str(raw: &str) -> Result<Efg<f64>, Error<'_>> {
    let gambit = ExtensiveFormGame::try_from(raw)?;
    let players = gambit.player_names().iter().map(|name| name.to_string());
    Ok(Builder::new(players).build(gambit.root()))
}

pub fn from_reader(reader: &mut impl Read) -> Efg<f64> {
    let mut buff = String::new();
    reader
        .read_to_string(&mut buff)
        .expect("couldn't read gambit game definition");
    from_str(&buff).expect("couldn't parse gambit game definition")
}
