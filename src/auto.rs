use super::gambit;
use super::json;
use efg::Efg;
use std::io::Read;

pub fn from_reader(mut reader: impl Read) -> Efg<f64> {
    let mut buff = String::new();
    reader
        .read_to_string(&mut buff)
        .expect("couldn't read game definition");
    if let Ok(game) = json::from_str(&buff) {
        game
    } else if let Ok(game) = gambit::from_str(&buff) {
        game
    } else {
        panic!("couldn't parse any known format; try specifying your format with `--input-format`");
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_json() {
        let game = super::from_reader(r#"{ "players": [], "root": { "terminal": [] } }"#.as_bytes());
        assert_eq!(game.num_players(), 0);
    }

    #[test]
    fn test_gambit() {
        let game = super::from_reader(r#"EFG 2 R "" { "" "" } t "" 1 { 0 0 }"#.as_bytes());
        assert_eq!(game.num_players(), 2);
    }

    #[test]
    #[should_panic(expected = "couldn't parse any known format")]
    fn test_error() {
        super::from_reader("random".as_bytes());
    }
}
