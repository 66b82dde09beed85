//! Adjective-noun workspace name generator (`brave-otter`).

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "brisk", "calm", "clever", "cosmic", "crisp", "dapper", "eager",
    "fancy", "fuzzy", "gentle", "golden", "happy", "hidden", "jolly", "keen", "lively", "lucky",
    "mellow", "merry", "misty", "nimble", "noble", "plucky", "proud", "quick", "quiet", "rapid",
    "rustic", "shiny", "silent", "sly", "snowy", "spry", "steady", "sunny", "swift", "tidy",
    "vivid", "wild", "witty", "zesty",
];

const NOUNS: &[&str] = &[
    "badger", "beacon", "birch", "bison", "canyon", "cedar", "comet", "cove", "crane", "delta",
    "falcon", "fern", "fjord", "gecko", "glacier", "harbor", "heron", "island", "jaguar", "lagoon",
    "lark", "lynx", "maple", "meadow", "mesa", "moose", "nebula", "orca", "otter", "panda",
    "pebble", "pine", "prairie", "quail", "raven", "reef", "ridge", "river", "sparrow", "summit",
    "tiger", "tundra", "walrus", "willow",
];

/// Attempts with a bare `adjective-noun` before a numeric suffix is added.
const PLAIN_ATTEMPTS: usize = 64;

/// Generate a name for which `taken` returns `false`.
pub fn generate_unique(taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    for _ in 0..PLAIN_ATTEMPTS {
        let candidate = pick(&mut rng);
        if !taken(&candidate) {
            return candidate;
        }
    }
    let base = pick(&mut rng);
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

fn pick(rng: &mut impl Rng) -> String {
    let a = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let n = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{a}-{n}")
}
