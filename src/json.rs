use efg::{Efg, GameError, InfosetId, MoveTarget, NodeId, PlayerId};
use serde::Deserialize;
use serde_json::Error;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
// NOTE BTreeMap keeps action order stable between nodes of the same infoset

#[derive(Deserialize)]
struct Definition {
    players: Vec<String>,
    root: State,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum State {
    Terminal(Vec<f64>),
    Chance {
        infoset: Option<String>,
        outcomes: BTreeMap<String, Outcome>,
    },
    Player {
        player: usize,
        infoset: String,
        actions: BTreeMap<String, State>,
    },
}

#[derive(Deserialize)]
struct Outcome {
    prob: f64,
    state: State,
}

#[derive(Default)]
struct Infosets {
    // unnamed chance nodes get their own infoset
    named: HashMap<(usize, String), InfosetId>,
}

impl Infosets {
    fn add_move<'a>(
        &mut self,
        game: &mut Efg<f64>,
        node: NodeId,
        player: usize,
        name: Option<String>,
        labels: impl ExactSizeIterator<Item = &'a String>,
    ) -> Result<(InfosetId, bool), GameError> {
        let actions = labels.len();
        let known = name
            .as_ref()
            .and_then(|name| self.named.get(&(player, name.clone())));
        let (target, fresh) = match known {
            Some(infoset) => (MoveTarget::Infoset(*infoset), false),
            None => (
                MoveTarget::New {
                    player: PlayerId::new(player),
                    actions,
                },
                true,
            ),
        };
        let infoset = game.add_move(node, target)?;
        if game.num_actions(infoset) != actions {
            return Err(GameError::ActionsNotEqual);
        }
        if fresh {
            for (ind, label) in labels.enumerate() {
                game.set_action_label(infoset, ind, label.as_str())?;
            }
            if let Some(name) = name {
                game.set_infoset_label(infoset, name.as_str())?;
                self.named.insert((player, name), infoset);
            }
        }
        Ok((infoset, fresh))
    }
}

fn from_definition(definition: Definition) -> Result<Efg<f64>, GameError> {
    let mut game = Efg::new(definition.players);
    let mut infosets = Infosets::default();
    let mut queue = vec![(definition.root, game.root())];
    while let Some((state, node)) = queue.pop() {
        match state {
            State::Terminal(payoffs) => {
                let outcome = game.new_outcome(payoffs)?;
                game.set_outcome(node, Some(outcome))?;
            }
            State::Chance { infoset, outcomes } => {
                let (id, fresh) =
                    infosets.add_move(&mut game, node, 0, infoset, outcomes.keys())?;
                if fresh {
                    let total: f64 = outcomes.values().map(|out| out.prob).sum();
                    let probs = outcomes.values().map(|out| out.prob / total).collect();
                    game.set_chance_probs(id, probs)?;
                }
                let children = game.children(node).to_vec();
                queue.extend(
                    outcomes
                        .into_values()
                        .map(|out| out.state)
                        .zip(children),
                );
            }
            State::Player {
                player,
                infoset,
                actions,
            } => {
                if player == 0 {
                    return Err(GameError::InvalidPlayer);
                }
                infosets.add_move(&mut game, node, player, Some(infoset), actions.keys())?;
                let children = game.children(node).to_vec();
                queue.extend(actions.into_values().zip(children));
            }
        }
    }
    Ok(game)
}

pub fn from_str(raw: &str) -> Result<Efg<f64>, Error> {
    let definition: Definition = serde_json::from_str(raw)?;
    Ok(from_valid(definition))
}

pub fn from_reader(reader: &mut impl Read) -> Efg<f64> {
    let definition =
        serde_json::from_reader(reader).expect("couldn't parse json game definition");
    from_valid(definition)
}

fn from_valid(definition: Definition) -> Efg<f64> {
    from_definition(definition)
        .expect("couldn't build a game from the json definition due to problems with the structure")
}
