use anyhow::{anyhow, Result};
use chimix_core::{Game, GameDraft, GameStatus};

const MAX_INPUT_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Developer,
    Publisher,
    Genres,
    Platforms,
    ReleaseDate,
    Rating,
    ImageUrl,
    WebsiteUrl,
    Status,
    HoursPlayed,
    PersonalRating,
    Notes,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Title,
        Field::Description,
        Field::Developer,
        Field::Publisher,
        Field::Genres,
        Field::Platforms,
        Field::ReleaseDate,
        Field::Rating,
        Field::ImageUrl,
        Field::WebsiteUrl,
        Field::Status,
        Field::HoursPlayed,
        Field::PersonalRating,
        Field::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title*",
            Field::Description => "Description",
            Field::Developer => "Developer",
            Field::Publisher => "Publisher",
            Field::Genres => "Genres (comma separated)",
            Field::Platforms => "Platforms (comma separated)",
            Field::ReleaseDate => "Release date (YYYY-MM-DD)",
            Field::Rating => "Rating (0-10)",
            Field::ImageUrl => "Image URL",
            Field::WebsiteUrl => "Website",
            Field::Status => "Status",
            Field::HoursPlayed => "Hours played",
            Field::PersonalRating => "Personal rating (0-10)",
            Field::Notes => "Notes",
        }
    }
}

/// Single-line text buffer with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.value.chars().count() >= MAX_INPUT_LEN {
            return;
        }
        let at = self.byte_index();
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.value.chars().count() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Add,
    Edit(u64),
}

/// Add/edit form. `Status` is cycled rather than typed.
#[derive(Debug, Clone)]
pub struct GameForm {
    pub target: FormTarget,
    inputs: Vec<TextInput>,
    status: GameStatus,
    focus: usize,
    metacritic: u32,
    ratings_count: u32,
}

impl GameForm {
    pub fn add() -> Self {
        Self::from_draft(FormTarget::Add, &GameDraft::default())
    }

    pub fn edit(game: &Game) -> Self {
        Self::from_draft(FormTarget::Edit(game.id), &GameDraft::from_game(game))
    }

    fn from_draft(target: FormTarget, draft: &GameDraft) -> Self {
        let rating = if target == FormTarget::Add {
            String::new()
        } else {
            draft.rating.to_string()
        };
        let inputs = Field::ALL
            .iter()
            .map(|field| match field {
                Field::Title => TextInput::new(draft.title.as_str()),
                Field::Description => TextInput::new(draft.description.as_str()),
                Field::Developer => TextInput::new(draft.developer.as_str()),
                Field::Publisher => TextInput::new(draft.publisher.as_str()),
                Field::Genres => TextInput::new(draft.genres.as_str()),
                Field::Platforms => TextInput::new(draft.platforms.as_str()),
                Field::ReleaseDate => TextInput::new(draft.release_date.as_str()),
                Field::Rating => TextInput::new(rating.as_str()),
                Field::ImageUrl => TextInput::new(draft.image_url.as_str()),
                Field::WebsiteUrl => TextInput::new(draft.website_url.as_str()),
                Field::Status => TextInput::default(),
                Field::HoursPlayed => TextInput::new(draft.hours_played.to_string()),
                Field::PersonalRating => TextInput::new(draft.personal_rating.to_string()),
                Field::Notes => TextInput::new(draft.notes.as_str()),
            })
            .collect();
        Self {
            target,
            inputs,
            status: draft.status,
            focus: 0,
            metacritic: draft.metacritic,
            ratings_count: draft.ratings_count,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.target {
            FormTarget::Add => "Add Game",
            FormTarget::Edit(_) => "Edit Game",
        }
    }

    pub fn focused(&self) -> Field {
        Field::ALL[self.focus]
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn move_focus(&mut self, delta: isize) {
        let len = Field::ALL.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn cycle_status(&mut self) {
        self.status = self.status.next();
    }

    pub fn input(&self, field: Field) -> &TextInput {
        &self.inputs[field_index(field)]
    }

    /// Buffer of the focused field, `None` on the status selector.
    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.focused() {
            Field::Status => None,
            field => self.inputs.get_mut(field_index(field)),
        }
    }

    /// Parse numeric fields and collect the draft. Range checks happen in the library.
    pub fn to_draft(&self) -> Result<GameDraft> {
        let text = |field| self.input(field).value().trim().to_string();
        let rating = parse_or_zero::<f64>(&text(Field::Rating))
            .map_err(|_| anyhow!("Rating must be a number"))?;
        let hours_played = parse_or_zero::<u32>(&text(Field::HoursPlayed))
            .map_err(|_| anyhow!("Hours played must be a whole number"))?;
        let personal_rating = parse_or_zero::<u8>(&text(Field::PersonalRating))
            .map_err(|_| anyhow!("Personal rating must be a whole number"))?;

        Ok(GameDraft {
            title: text(Field::Title),
            description: text(Field::Description),
            developer: text(Field::Developer),
            publisher: text(Field::Publisher),
            genres: text(Field::Genres),
            platforms: text(Field::Platforms),
            release_date: text(Field::ReleaseDate),
            rating,
            image_url: text(Field::ImageUrl),
            website_url: text(Field::WebsiteUrl),
            status: self.status,
            hours_played,
            personal_rating,
            notes: self.input(Field::Notes).value().to_string(),
            metacritic: self.metacritic,
            ratings_count: self.ratings_count,
        })
    }
}

fn field_index(field: Field) -> usize {
    Field::ALL
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0)
}

fn parse_or_zero<N: std::str::FromStr + Default>(value: &str) -> Result<N, N::Err> {
    if value.is_empty() {
        Ok(N::default())
    } else {
        value.parse()
    }
}
