use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::board::{normalize, Board};

/// Separates the four items of a guess in an agent reply.
pub const DELIMITER: &str = "--";

/// Four distinct, upper-cased words from the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guess([String; 4]);

impl Guess {
    pub fn words(&self) -> &[String; 4] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|own| own == word)
    }

    /// How many words the two guesses share, irrespective of order.
    pub fn overlap(&self, other: &Self) -> usize {
        self.iter().filter(|word| other.contains(word)).count()
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(DELIMITER))
    }
}

/// Splits a free-text reply into candidate items. Blank items are dropped.
pub fn split_reply(reply: &str) -> Vec<String> {
    reply
        .split(DELIMITER)
        .map(normalize)
        .filter(|item| !item.is_empty())
        .collect()
}

/// The words still in play, kept in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWords {
    order: Vec<String>,
    groups: HashMap<String, usize>,
}

impl ValidWords {
    pub fn from_board(board: &Board) -> Self {
        let groups = board.word_to_group();
        Self {
            order: board.layout().to_vec(),
            groups,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.groups.contains_key(word)
    }

    pub fn group_of(&self, word: &str) -> Option<usize> {
        self.groups.get(word).copied()
    }

    /// Takes a solved category's words out of play.
    pub fn remove_group(&mut self, group: usize) {
        self.groups.retain(|_, other| *other != group);
        let groups = &self.groups;
        self.order.retain(|word| groups.contains_key(word));
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Checks a candidate against the words in play and the guesses already
/// made, in that order. Repeated words count once.
pub fn validate(
    candidate: &[String],
    valid: &ValidWords,
    history: &[Guess],
) -> Result<Guess, GuessError> {
    let mut words: Vec<String> = Vec::with_capacity(4);
    for word in candidate.iter().map(|item| normalize(item)) {
        if !word.is_empty() && !words.contains(&word) {
            words.push(word);
        }
    }

    let words: [String; 4] = words
        .try_into()
        .map_err(|words: Vec<_>| WrongArityError { count: words.len() })?;

    let unknown: Vec<String> = words
        .iter()
        .filter(|word| !valid.contains(word))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(UnknownWordsError {
            unknown: WordList(unknown),
            valid: WordList(valid.words().map(str::to_owned).collect()),
        }
        .into());
    }

    let guess = Guess(words);
    if history.iter().any(|previous| previous.overlap(&guess) >= 4) {
        return Err(DuplicateGuessError { guess }.into());
    }

    Ok(guess)
}

/// Comma-separated list of words, for messages and log fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList(pub Vec<String>);

impl fmt::Display for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, thisslime::TracingError)]
#[span(level = WARN)]
pub enum GuessError {
    #[error(transparent)]
    WrongArity(#[from] WrongArityError),

    #[error(transparent)]
    UnknownWords(#[from] UnknownWordsError),

    #[error(transparent)]
    DuplicateGuess(#[from] DuplicateGuessError),
}

impl GuessError {
    /// What to tell the agent so it can try again.
    pub fn corrective_prompt(&self) -> String {
        match self {
            Self::WrongArity(WrongArityError { count }) => {
                let problem = if *count < 4 {
                    "not enough items"
                } else {
                    "too many items"
                };

                format!(
                    "Invalid Play Detected, {problem}, Please only respond with one guess \
                     separated by '{DELIMITER}' with 4 entries from the game and no other info."
                )
            }
            Self::UnknownWords(UnknownWordsError { unknown, valid }) => format!(
                "Invalid Play Detected, invalid words detected ({unknown}) are not valid \
                 guesses, Valid guesses include ({valid}), Please only respond with one play \
                 separated by '{DELIMITER}' with 4 entries from the game and no other info."
            ),
            Self::DuplicateGuess(_) => {
                "You already made this play, Please make a different guess.".to_owned()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, thisslime::TracingError)]
#[error("guess has {count} distinct items, expected 4")]
#[event(level = WARN)]
pub struct WrongArityError {
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, thisslime::TracingError)]
#[error("words not on the board: {unknown}")]
#[event(level = WARN)]
pub struct UnknownWordsError {
    #[field(print = Display)]
    pub unknown: WordList,

    #[field(print = Display)]
    pub valid: WordList,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, thisslime::TracingError)]
#[error("guess {guess} was already played")]
#[event(level = WARN)]
pub struct DuplicateGuessError {
    #[field(print = Display)]
    pub guess: Guess,
}

#[cfg(test)]
pub(crate) fn guess(words: [&str; 4]) -> Guess {
    Guess(words.map(str::to_owned))
}
