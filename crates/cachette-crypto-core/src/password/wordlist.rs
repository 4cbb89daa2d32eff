//! Embedded passphrase wordlist.
//!
//! 256 short, common, unambiguous English words. The power-of-two size
//! gives exactly 8 bits of entropy per uniformly-drawn word.

/// Number of words in the list.
pub const WORD_COUNT: usize = 256;

/// Returns the embedded wordlist.
#[must_use]
pub const fn words() -> &'static [&'static str; WORD_COUNT] {
    &WORDS
}

static WORDS: [&str; WORD_COUNT] = [
    "acorn", "actor", "adapt", "admire", "adopt", "agile", "alarm", "album",
    "alien", "alley", "amber", "anchor", "angle", "ankle", "antler", "apple",
    "apron", "arbor", "arena", "argue", "armor", "arrow", "aspen", "atlas",
    "attic", "autumn", "avenue", "awake", "badge", "bagel", "baker", "bamboo",
    "banjo", "barley", "basil", "basket", "beacon", "beaver", "berry", "birch",
    "bishop", "bison", "blanket", "blazer", "blouse", "bobcat", "bonfire", "border",
    "bottle", "boulder", "bramble", "brave", "breeze", "brick", "bridge", "bronze",
    "brook", "bucket", "budget", "bugle", "bundle", "burrow", "butler", "button",
    "cabin", "cactus", "camel", "candle", "canoe", "canyon", "carbon", "cargo",
    "carpet", "carrot", "castle", "cedar", "cellar", "cello", "census", "chalk",
    "chapel", "cherry", "chisel", "cider", "circus", "citrus", "clover", "cobalt",
    "cobbler", "comet", "compass", "copper", "coral", "cotton", "cougar", "cradle",
    "crater", "crayon", "cricket", "crystal", "custard", "cypress", "daisy", "dapper",
    "decoy", "denim", "derby", "desert", "diesel", "dimple", "dinghy", "dolphin",
    "donkey", "dragon", "drift", "drum", "dusk", "eagle", "easel", "echo",
    "elbow", "elder", "ember", "emblem", "envoy", "ermine", "fable", "falcon",
    "feather", "fedora", "fennel", "ferry", "fiddle", "finch", "fjord", "flannel",
    "flint", "foggy", "forest", "fossil", "foyer", "frost", "gadget", "galaxy",
    "garland", "garnet", "gazebo", "gecko", "giddy", "ginger", "glacier", "goblet",
    "gopher", "granite", "grape", "gravel", "grotto", "hamlet", "hammock", "harbor",
    "hazel", "hedge", "heron", "hickory", "hillside", "hobby", "hollow", "hornet",
    "hurdle", "igloo", "indigo", "ingot", "island", "ivory", "jackal", "jasper",
    "jigsaw", "jovial", "jungle", "juniper", "kayak", "kettle", "kiosk", "kitten",
    "knapsack", "lagoon", "lantern", "larch", "ledger", "lemon", "lilac", "lizard",
    "lobster", "locket", "lumber", "lyric", "magnet", "mango", "manor", "maple",
    "marble", "meadow", "melon", "mirror", "mitten", "monsoon", "morsel", "mosaic",
    "mulberry", "mural", "mustang", "napkin", "nectar", "nimble", "nutmeg", "oasis",
    "ocelot", "olive", "onyx", "orchard", "osprey", "otter", "oxcart", "paddle",
    "pagoda", "papaya", "pebble", "pelican", "pepper", "pigeon", "pillar", "pinecone",
    "plume", "pocket", "poplar", "pretzel", "puffin", "quartz", "quiver", "raccoon",
    "raven", "ribbon", "ripple", "saddle", "saffron", "sandal", "sapling", "sequoia",
    "shale", "sierra", "sparrow", "spruce", "summit", "tundra", "velvet", "walnut",
];
