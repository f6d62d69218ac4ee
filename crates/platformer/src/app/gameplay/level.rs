use engine::{TileGrid, TileGridError, TileType, TileTypeTable};

pub(crate) const GROUND: u16 = 1;
pub(crate) const BRICK: u16 = 2;
pub(crate) const PLATFORM: u16 = 3;
pub(crate) const COIN: u16 = 4;
pub(crate) const QUESTION: u16 = 5;
pub(crate) const SPIN: u16 = 6;
pub(crate) const USED_BLOCK: u16 = 51;

const LEGEND: [(char, u16); 6] = [
    ('#', GROUND),
    ('B', BRICK),
    ('=', PLATFORM),
    ('o', COIN),
    ('?', QUESTION),
    ('~', SPIN),
];

const DEMO_ROWS: [&str; 18] = [
    "................................................................",
    "................................................................",
    "................................................................",
    "................................................................",
    "................................................................",
    "................................................................",
    "................................................................",
    "................................................................",
    "................................................................",
    "....................................................?...........",
    ".........................ooo....................................",
    "........?B?B?...................................................",
    "................ooo...........................BB........ooo.....",
    "........................=====.................BB................",
    "....................................BB........BB................",
    "....................................BB..~~~~..BB................",
    "################################################################",
    "################################################################",
];

pub(crate) fn tile_types() -> TileTypeTable {
    TileTypeTable::from_pairs(&[
        (GROUND, TileType::Solid),
        (BRICK, TileType::Solid),
        (PLATFORM, TileType::OneWay),
        (COIN, TileType::Coin),
        (QUESTION, TileType::Question),
        (SPIN, TileType::Spin),
        (USED_BLOCK, TileType::Solid),
    ])
}

pub(crate) fn demo_level() -> Result<TileGrid, TileGridError> {
    TileGrid::from_rows(&DEMO_ROWS, &LEGEND, tile_types())
}
