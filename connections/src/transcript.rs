use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::board::Color;

/// Matches the share text the game produces: a title line, a puzzle number
/// line, then rows of colored squares.
static TRANSCRIPT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Connections.*\nPuzzle.*#[0-9,]+.*\n[🟨🟩🟦🟪\n]+")
        .expect("hard-coded regex should be valid")
});

/// A score transcript found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub number: u32,
    pub text: String,
}

impl Transcript {
    /// Finds the first transcript in `content`, if any.
    pub fn find(content: &str) -> Option<Self> {
        let text = TRANSCRIPT_PATTERN.find(content)?.as_str().trim_end();
        let number = puzzle_number(text)?;

        Some(Self {
            number,
            text: text.to_owned(),
        })
    }

    pub fn record(&self) -> ScoreRecord {
        ScoreRecord::parse(&self.text)
    }
}

/// The puzzle number after the first `#`, with thousands separators removed.
pub fn puzzle_number(text: &str) -> Option<u32> {
    let digits: String = text
        .split_once('#')?
        .1
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();

    digits.parse().ok()
}

/// Persisted summary of one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Rows of guesses, i.e. every line after the title and number.
    pub plays: u32,

    /// Ranking value, higher is better.
    pub score: u32,

    /// Whether each color's category was solved, yellow first.
    pub completed: [bool; 4],
}

impl ScoreRecord {
    pub fn parse(text: &str) -> Self {
        let lines = text.split('\n').count() as u32;
        let plays = lines.saturating_sub(2);

        let completed = Color::ALL.map(|color| text.contains(&color.solved_row()));

        let score = if completed.iter().all(|solved| *solved) {
            match plays {
                4 => 6,
                5 => 5,
                6 => 3,
                _ => 4,
            }
        } else {
            completed.iter().filter(|solved| **solved).count() as u32
        };

        Self {
            plays,
            score,
            completed,
        }
    }

    pub fn solved(&self) -> usize {
        self.completed.iter().filter(|solved| **solved).count()
    }

    pub fn is_perfect(&self) -> bool {
        self.completed.iter().all(|solved| *solved) && self.plays == 4
    }
}

#[cfg(test)]
mod tests {
    use paste::paste;
    use pretty_assertions::assert_eq;

    use super::{puzzle_number, ScoreRecord, Transcript};

    macro_rules! record {
        ($($name:ident: $text:expr => $plays:literal, $score:literal, $completed:expr;)+) => {
            paste! {
                $(
                    #[test]
                    fn [<record_ $name>]() {
                        assert_eq!(
                            ScoreRecord::parse($text),
                            ScoreRecord {
                                plays: $plays,
                                score: $score,
                                completed: $completed,
                            }
                        );
                    }
                )+
            }
        };
    }

    record! {
        perfect: "Connections\nPuzzle #342\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪"
            => 4, 6, [true; 4];
        one_mistake: "Connections\nPuzzle #342\n🟨🟨🟨🟨\n🟩🟦🟩🟩\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪"
            => 5, 5, [true; 4];
        two_mistakes: "Connections\nPuzzle #342\n🟨🟨🟨🟨\n🟩🟦🟩🟩\n🟩🟪🟩🟩\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪"
            => 6, 3, [true; 4];
        three_mistakes: "Connections\nPuzzle #342\n🟨🟩🟨🟨\n🟨🟦🟨🟨\n🟨🟪🟨🟨\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪"
            => 7, 4, [true; 4];
        lost_two_solved: "Connections\nPuzzle #342\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟪🟦🟦\n🟪🟦🟦🟦\n🟦🟦🟪🟪\n🟦🟪🟪🟪"
            => 6, 2, [true, true, false, false];
        lost_none_solved: "Connections\nPuzzle #342\n🟦🟪🟦🟦\n🟪🟦🟦🟦\n🟦🟦🟪🟪\n🟦🟪🟪🟪"
            => 4, 0, [false; 4];
        header_only: "Connections\nPuzzle #342"
            => 0, 0, [false; 4];
    }

    #[test]
    fn parse_is_repeatable() {
        let text = "Connections\nPuzzle #342\n🟨🟨🟨🟨\n🟩🟦🟩🟩\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪";

        assert_eq!(ScoreRecord::parse(text), ScoreRecord::parse(text));
    }

    #[test]
    fn find_in_message() {
        let content = "ugh, today was rough\nConnections\nPuzzle #1,042\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪\n\nbut i did it";

        let transcript = Transcript::find(content).expect("should find transcript");

        assert_eq!(transcript.number, 1042);
        assert_eq!(
            transcript.text,
            "Connections\nPuzzle #1,042\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\n🟪🟪🟪🟪"
        );
        assert_eq!(transcript.record().score, 6);
    }

    #[test]
    fn find_nothing() {
        assert_eq!(Transcript::find("Connections are hard today"), None);
        assert_eq!(Transcript::find("Connections\nPuzzle #\n🟨🟨🟨🟨"), None);
    }

    #[test]
    fn puzzle_numbers() {
        assert_eq!(puzzle_number("Puzzle #342"), Some(342));
        assert_eq!(puzzle_number("Puzzle #1,234 "), Some(1234));
        assert_eq!(puzzle_number("Puzzle 342"), None);
    }
}
