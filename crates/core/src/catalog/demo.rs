//! Bundled sample records served in demo mode and as the failure fallback.

use once_cell::sync::Lazy;

use super::raw::{NamedRef, PlatformEntry, RawGame, StoreRef, StoreEntry};

static DEMO_GAMES: Lazy<Vec<RawGame>> = Lazy::new(build_dataset);

/// The fixed demo dataset in its canonical order.
pub fn demo_games() -> &'static [RawGame] {
    &DEMO_GAMES
}

/// First `limit` demo records.
pub fn demo_listing(limit: usize) -> Vec<RawGame> {
    demo_games().iter().take(limit).cloned().collect()
}

/// Demo records whose name or plain description contains `query`,
/// case-insensitively, truncated to `limit`.
pub fn demo_search(query: &str, limit: usize) -> Vec<RawGame> {
    let needle = query.trim().to_lowercase();
    demo_games()
        .iter()
        .filter(|game| {
            game.name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
                || game
                    .description_raw
                    .as_deref()
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Demo record with the given id.
pub fn demo_details(id: u64) -> Option<RawGame> {
    demo_games().iter().find(|game| game.id == id).cloned()
}

/// The demo record's cover image as its only screenshot.
pub fn demo_screenshots(id: u64) -> Vec<String> {
    demo_details(id)
        .and_then(|game| game.background_image)
        .filter(|url| !url.is_empty())
        .into_iter()
        .collect()
}

struct Sample {
    id: u64,
    name: &'static str,
    description: &'static str,
    rating: f64,
    rating_top: f64,
    ratings_count: u32,
    metacritic: u32,
    released: &'static str,
    image: &'static str,
    genre: (u64, &'static str),
    studio: (u64, &'static str),
    publisher: (u64, &'static str),
    playtime: u32,
    steam_url: Option<&'static str>,
    website: Option<&'static str>,
}

impl Sample {
    fn into_raw(self) -> RawGame {
        let named = |(id, name): (u64, &str)| NamedRef {
            id: Some(id),
            name: Some(name.to_string()),
        };
        RawGame {
            id: self.id,
            name: Some(self.name.to_string()),
            description: None,
            description_raw: Some(self.description.to_string()),
            rating: Some(self.rating),
            rating_top: Some(self.rating_top),
            ratings_count: Some(self.ratings_count),
            metacritic: Some(self.metacritic),
            released: Some(self.released.to_string()),
            background_image: Some(self.image.to_string()),
            genres: Some(vec![named(self.genre)]),
            platforms: Some(vec![PlatformEntry {
                platform: Some(named((4, "PC"))),
            }]),
            developers: Some(vec![named(self.studio)]),
            publishers: Some(vec![named(self.publisher)]),
            playtime: Some(self.playtime),
            website: self.website.map(str::to_string),
            stores: self.steam_url.map(|url| {
                vec![StoreEntry {
                    id: Some(1),
                    store: Some(StoreRef {
                        id: Some(1),
                        name: Some("Steam".to_string()),
                        domain: Some("store.steampowered.com".to_string()),
                    }),
                    url: Some(url.to_string()),
                }]
            }),
        }
    }
}

fn build_dataset() -> Vec<RawGame> {
    vec![
        Sample {
            id: 3498,
            name: "Grand Theft Auto V",
            description: "Rockstar Games went bigger, since their previous installment of the series. You get the complicated and realistic world to explore along with the new story.",
            rating: 4.47,
            rating_top: 5.0,
            ratings_count: 6585,
            metacritic: 92,
            released: "2013-09-17",
            image: "https://media.rawg.io/media/games/20a/20aa03a10cda45239fe22d035c0ebe64.jpg",
            genre: (4, "Action"),
            studio: (3524, "Rockstar North"),
            publisher: (2155, "Rockstar Games"),
            playtime: 74,
            steam_url: Some("https://store.steampowered.com/app/271590/"),
            website: Some("https://www.rockstargames.com/gta-v"),
        },
        Sample {
            id: 4200,
            name: "Portal 2",
            description: "The sequel to the acclaimed Portal (2007), Portal 2 pits the protagonist of the original game, Chell, and her AI companion, GLaDOS, against more puzzles.",
            rating: 4.61,
            rating_top: 5.0,
            ratings_count: 4463,
            metacritic: 95,
            released: "2011-04-19",
            image: "https://media.rawg.io/media/games/2ba/2bac0e87cf45e5b508f227d281c9252a.jpg",
            genre: (2, "Shooter"),
            studio: (1699, "Valve Corporation"),
            publisher: (1699, "Valve Corporation"),
            playtime: 11,
            steam_url: Some("https://store.steampowered.com/app/620/"),
            website: Some("https://www.valvesoftware.com/games/"),
        },
        Sample {
            id: 3328,
            name: "The Witcher 3: Wild Hunt",
            description: "The third game in a series, it holds nothing back from the player. Open world adventures of the renowned monster slayer Geralt of Rivia are now even on a larger scale.",
            rating: 4.66,
            rating_top: 5.0,
            ratings_count: 6126,
            metacritic: 93,
            released: "2015-05-18",
            image: "https://media.rawg.io/media/games/618/618c2031a07bbff6b4f611f10b6bcdbc.jpg",
            genre: (5, "RPG"),
            studio: (9023, "CD PROJEKT RED"),
            publisher: (9023, "CD PROJEKT RED"),
            playtime: 46,
            steam_url: Some("https://store.steampowered.com/app/292030/"),
            website: Some("https://www.thewitcher.com/witcher3"),
        },
        Sample {
            id: 5286,
            name: "Tomb Raider",
            description: "A reboot of the Tomb Raider franchise, featuring a young Lara Croft on her first adventure.",
            rating: 4.05,
            rating_top: 4.0,
            ratings_count: 4832,
            metacritic: 86,
            released: "2013-03-05",
            image: "https://media.rawg.io/media/games/021/021c4e21a1824d2526f925eff6324653.jpg",
            genre: (4, "Action"),
            studio: (5775, "Crystal Dynamics"),
            publisher: (9685, "Square Enix"),
            playtime: 10,
            steam_url: None,
            website: None,
        },
        Sample {
            id: 4291,
            name: "Counter-Strike: Global Offensive",
            description: "Counter-Strike: Global Offensive (CS: GO) expands upon the team-based action gameplay that it pioneered when it was launched 19 years ago.",
            rating: 3.57,
            rating_top: 4.0,
            ratings_count: 6963,
            metacritic: 83,
            released: "2012-08-21",
            image: "https://media.rawg.io/media/games/736/73619bd336c894d6941d926bfd563946.jpg",
            genre: (2, "Shooter"),
            studio: (1699, "Valve Corporation"),
            publisher: (1699, "Valve Corporation"),
            playtime: 64,
            steam_url: None,
            website: None,
        },
        Sample {
            id: 13536,
            name: "Portal",
            description: "Portal is a new single player game from Valve. Set in the mysterious Aperture Science Laboratories, Portal has been called one of the most innovative new games on the horizon.",
            rating: 4.51,
            rating_top: 5.0,
            ratings_count: 3514,
            metacritic: 90,
            released: "2007-10-09",
            image: "https://media.rawg.io/media/games/7fa/7fa0b586293c5861ee32490e953a4996.jpg",
            genre: (2, "Shooter"),
            studio: (1699, "Valve Corporation"),
            publisher: (1699, "Valve Corporation"),
            playtime: 4,
            steam_url: None,
            website: None,
        },
    ]
    .into_iter()
    .map(Sample::into_raw)
    .collect()
}
