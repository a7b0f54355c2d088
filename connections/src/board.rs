use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::solution::Solution;

/// Category colors, easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Green,
    Blue,
    Purple,
}

impl Color {
    pub const ALL: [Self; 4] = [Self::Yellow, Self::Green, Self::Blue, Self::Purple];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Yellow),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            3 => Some(Self::Purple),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Yellow => "🟨",
            Self::Green => "🟩",
            Self::Blue => "🟦",
            Self::Purple => "🟪",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
        }
    }

    /// Four of this color's icon, as it appears in a transcript when the
    /// category is solved.
    pub fn solved_row(self) -> String {
        self.icon().repeat(4)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn normalize(word: &str) -> String {
    word.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    color: Color,
    members: [String; 4],
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn members(&self) -> &[String; 4] {
        &self.members
    }

    pub fn contains(&self, word: &str) -> bool {
        self.members.iter().any(|member| member == word)
    }
}

/// A validated puzzle: four categories of four words, laid out on a
/// 4x4 grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    categories: [Category; 4],
    layout: [String; 16],
}

impl Board {
    pub fn from_solution(solution: &Solution) -> Result<Self, MalformedSolution> {
        let count = solution.categories.len();
        if count != 4 {
            return Err(MalformedSolution::CategoryCount(count));
        }

        let mut layout: [Option<String>; 16] = Default::default();
        let mut categories = Vec::with_capacity(4);

        for (index, category) in solution.categories.iter().enumerate() {
            let color = Color::from_index(index).ok_or(MalformedSolution::CategoryCount(count))?;

            let mut members = Vec::with_capacity(4);
            for card in &category.cards {
                let word = normalize(&card.content);

                let slot = layout
                    .get_mut(card.position)
                    .ok_or(MalformedSolution::Position(card.position))?;
                if slot.is_some() {
                    return Err(MalformedSolution::PositionReused(card.position));
                }
                if layout.iter().flatten().any(|placed| *placed == word) {
                    return Err(MalformedSolution::DuplicateWord(word));
                }

                layout[card.position] = Some(word.clone());
                members.push(word);
            }

            let members: [String; 4] = members
                .try_into()
                .map_err(|members: Vec<_>| CardCountError {
                    category: index,
                    count: members.len(),
                })?;

            categories.push(Category {
                name: category.title.trim().to_owned(),
                color,
                members,
            });
        }

        // 16 cards with distinct in-range positions always fill the grid
        let layout = layout.map(Option::unwrap_or_default);
        let categories = categories
            .try_into()
            .map_err(|categories: Vec<_>| MalformedSolution::CategoryCount(categories.len()))?;

        Ok(Self { categories, layout })
    }

    pub fn categories(&self) -> &[Category; 4] {
        &self.categories
    }

    pub fn category(&self, group: usize) -> Option<&Category> {
        self.categories.get(group)
    }

    /// Words in board order, top left to bottom right.
    pub fn layout(&self) -> &[String; 16] {
        &self.layout
    }

    pub fn group_of(&self, word: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.contains(word))
    }

    pub fn color_of(&self, word: &str) -> Option<Color> {
        self.group_of(word).and_then(Color::from_index)
    }

    pub fn word_to_group(&self) -> HashMap<String, usize> {
        self.categories
            .iter()
            .enumerate()
            .flat_map(|(group, category)| {
                category
                    .members
                    .iter()
                    .map(move |word| (word.clone(), group))
            })
            .collect()
    }

    /// The board as four rows of four, each row joined with `--`.
    pub fn layout_text(&self) -> String {
        self.layout
            .chunks(4)
            .map(|row| row.join("--"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every category name followed by its members, used when a game is
    /// lost.
    pub fn reveal_text(&self) -> String {
        self.categories
            .iter()
            .map(|category| format!("{}\n{}", category.name, category.members.join("--")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, thisslime::TracingError)]
#[span(level = WARN)]
pub enum MalformedSolution {
    #[error("expected 4 categories, found {0}")]
    #[event(level = WARN)]
    CategoryCount(usize),

    #[error(transparent)]
    CardCount(#[from] CardCountError),

    #[error("card position {0} is outside the board")]
    #[event(level = WARN)]
    Position(usize),

    #[error("board position {0} is used more than once")]
    #[event(level = WARN)]
    PositionReused(usize),

    #[error("'{0}' appears on the board more than once")]
    #[event(level = WARN)]
    DuplicateWord(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, thisslime::TracingError)]
#[error("category {category} has {count} cards, expected 4")]
#[event(level = WARN)]
pub struct CardCountError {
    pub category: usize,
    pub count: usize,
}
