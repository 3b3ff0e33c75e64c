// Deployment names: a memorable word plus the database type, e.g.
// `pikachu-mongodb`.

use rand::Rng;

/// Word pool for deployment names. Lowercase ASCII only.
pub const NAMES: &[&str] = &[
    "bulbasaur", "ivysaur", "venusaur", "charmander", "charmeleon", "charizard",
    "squirtle", "wartortle", "blastoise", "caterpie", "metapod", "butterfree",
    "weedle", "kakuna", "beedrill", "pidgey", "pidgeotto", "pidgeot", "rattata",
    "raticate", "spearow", "fearow", "ekans", "arbok", "pikachu", "raichu",
    "sandshrew", "sandslash", "nidorina", "nidoqueen", "nidorino", "nidoking",
    "clefairy", "clefable", "vulpix", "ninetales", "jigglypuff", "wigglytuff",
    "zubat", "golbat", "oddish", "gloom", "vileplume", "paras", "parasect",
    "venonat", "venomoth", "diglett", "dugtrio", "meowth", "persian", "psyduck",
    "golduck", "mankey", "primeape", "growlithe", "arcanine", "poliwag",
    "poliwhirl", "poliwrath", "abra", "kadabra", "alakazam", "machop", "machoke",
    "machamp", "bellsprout", "weepinbell", "victreebel", "tentacool",
    "tentacruel", "geodude", "graveler", "golem", "ponyta", "rapidash",
    "slowpoke", "slowbro", "magnemite", "magneton", "doduo", "dodrio", "seel",
    "dewgong", "grimer", "muk", "shellder", "cloyster", "gastly", "haunter",
    "gengar", "onix", "drowzee", "hypno", "krabby", "kingler", "voltorb",
    "electrode", "exeggcute", "exeggutor", "cubone", "marowak", "hitmonlee",
    "hitmonchan", "lickitung", "koffing", "weezing", "rhyhorn", "rhydon",
    "chansey", "tangela", "kangaskhan", "horsea", "seadra", "goldeen", "seaking",
    "staryu", "starmie", "scyther", "jynx", "electabuzz", "magmar", "pinsir",
    "tauros", "magikarp", "gyarados", "lapras", "ditto", "eevee", "vaporeon",
    "jolteon", "flareon", "porygon", "omanyte", "omastar", "kabuto", "kabutops",
    "aerodactyl", "snorlax", "articuno", "zapdos", "moltres", "dratini",
    "dragonair", "dragonite", "mewtwo", "mew",
];

/// Supplies the memorable half of a deployment name.
pub trait WordSource {
    fn word(&mut self) -> &'static str;
}

/// Picks uniformly from [`NAMES`].
pub struct RandomWords<R>(pub R);

impl<R: Rng> WordSource for RandomWords<R> {
    fn word(&mut self) -> &'static str {
        NAMES[self.0.gen_range(0..NAMES.len())]
    }
}

/// Always hands out the same word.
pub struct FixedWord(pub &'static str);

impl WordSource for FixedWord {
    fn word(&mut self) -> &'static str {
        self.0
    }
}

pub fn deployment_name(word: &str, kind: &str) -> String {
    format!("{}-{}", word.to_lowercase(), kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_is_lowercase_ascii() {
        assert!(!NAMES.is_empty());
        for name in NAMES {
            assert!(
                !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase()),
                "bad pool entry {name:?}"
            );
        }
    }

    #[test]
    fn name_is_word_dash_type() {
        assert_eq!(deployment_name("Pikachu", "mongodb"), "pikachu-mongodb");
    }

    #[test]
    fn random_words_come_from_the_pool() {
        let mut words = RandomWords(rand::thread_rng());
        for _ in 0..200 {
            let name = deployment_name(words.word(), "redis");
            let (word, kind) = name.split_once('-').unwrap();
            assert!(NAMES.contains(&word));
            assert_eq!(kind, "redis");
        }
    }
}
