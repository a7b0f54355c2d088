use thisslime::TracingError;
use tracing::{debug, info, instrument, warn};

use crate::{
    agent::{ChatMessage, GuessingAgent},
    board::Board,
    guess::{split_reply, validate, Guess, GuessError, ValidWords},
    score::{classify, icon_row, Outcome},
};

/// Solicitations allowed per game before it is abandoned.
pub const ROUND_CEILING: u32 = 20;

/// Wrong guesses allowed before the game is lost.
pub const MISS_LIMIT: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayState {
    AwaitingGuess,
    Evaluating,
    Won,
    Lost,
    Aborted(AbortReason),
}

impl PlayState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub fn is_over(&self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Aborted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    RoundCeilingExceeded,

    /// The agent failed to answer; holds the error message.
    AgentProtocol(String),
}

/// What happened to one submitted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnKind {
    Rejected(GuessError),
    Scored { guess: Guess, outcome: Outcome },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub kind: TurnKind,

    /// The next message for the agent: a correction, feedback, or the
    /// closing message once the game is over.
    pub prompt: String,
}

/// One agent's attempt at one board.
#[derive(Debug, Clone)]
pub struct PlaySession<'board> {
    board: &'board Board,
    valid: ValidWords,
    history: Vec<Guess>,
    rows: Vec<String>,
    correct: u32,
    misses: u32,
    rounds: u32,
    state: PlayState,
}

impl<'board> PlaySession<'board> {
    pub fn new(board: &'board Board) -> Self {
        Self {
            board,
            valid: ValidWords::from_board(board),
            history: Vec::new(),
            rows: Vec::new(),
            correct: 0,
            misses: 0,
            rounds: 0,
            state: PlayState::AwaitingGuess,
        }
    }

    pub fn state(&self) -> &PlayState {
        &self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn history(&self) -> &[Guess] {
        &self.history
    }

    /// The message that starts a game.
    pub fn opening_prompt(&self) -> String {
        format!(
            "Play this connections game, Respond with one play at a time:\n{}",
            self.board.layout_text()
        )
    }

    /// Counts a new solicitation. Returns `false`, aborting the game, once
    /// [`ROUND_CEILING`] solicitations have been made.
    pub fn next_round(&mut self) -> bool {
        if self.is_over() {
            return false;
        }

        if self.rounds >= ROUND_CEILING {
            self.state = PlayState::Aborted(AbortReason::RoundCeilingExceeded);
            return false;
        }

        self.rounds += 1;
        true
    }

    pub fn abort(&mut self, reason: AbortReason) {
        if !self.is_over() {
            self.state = PlayState::Aborted(reason);
        }
    }

    /// Validates and scores one reply. Returns `None` once the game is over.
    pub fn submit(&mut self, candidate: &[String]) -> Option<Turn> {
        if self.is_over() {
            return None;
        }

        let guess = match validate(candidate, &self.valid, &self.history) {
            Ok(guess) => guess,
            Err(err) => {
                let prompt = err.corrective_prompt();
                return Some(Turn {
                    kind: TurnKind::Rejected(err),
                    prompt,
                });
            }
        };

        self.state = PlayState::Evaluating;
        self.history.push(guess.clone());
        self.rows.push(icon_row(&guess, self.board));

        let outcome = classify(&guess, self.board);
        let feedback = match &outcome {
            Outcome::Correct { group, name } => {
                self.correct += 1;
                self.valid.remove_group(*group);

                let color = self
                    .board
                    .category(*group)
                    .map(|category| category.color().name())
                    .unwrap_or_default();
                format!(
                    "Correct, you guessed the {color} category, which was {name}. \
                     Please Enter Next Guess"
                )
            }
            Outcome::OneAway => {
                self.misses += 1;
                "Incorrect, but you are off by one. Please Enter Next Guess. \
                 Try to find the guess to replace, in your last response, to get the correct answer."
                    .to_owned()
            }
            Outcome::Incorrect => {
                self.misses += 1;
                "Incorrect. Please Enter Next Guess".to_owned()
            }
        };

        self.state = if self.correct >= 4 {
            PlayState::Won
        } else if self.misses >= MISS_LIMIT {
            PlayState::Lost
        } else {
            PlayState::AwaitingGuess
        };

        let prompt = self.closing_message().unwrap_or(feedback);

        Some(Turn {
            kind: TurnKind::Scored { guess, outcome },
            prompt,
        })
    }

    /// The final message to the agent, once the game is won or lost.
    pub fn closing_message(&self) -> Option<String> {
        match self.state {
            PlayState::Won => Some("Correct, You win All Categories have been guessed.".to_owned()),
            PlayState::Lost => Some(format!(
                "Incorrect, Game Over\nThe Correct Connections with their category name are:\n{}",
                self.board.reveal_text()
            )),
            _ => None,
        }
    }

    /// The agent's result in the same format players share theirs.
    pub fn grid(&self, number: u32) -> String {
        let mut grid = format!("Connections\nPuzzle #{}", group_thousands(number));
        for row in &self.rows {
            grid.push('\n');
            grid.push_str(row);
        }
        grid
    }
}

/// Formats a number with `,` between groups of three digits.
pub fn group_thousands(number: u32) -> String {
    let digits = number.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

/// A finished (or abandoned) game, with everything said during it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playthrough {
    pub number: u32,
    pub state: PlayState,
    pub grid: String,
    pub rounds: u32,
    pub conversation: Vec<ChatMessage>,
}

impl Playthrough {
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

/// Plays `board` with `agent`, continuing `conversation`.
#[instrument(skip_all, fields(game = number))]
pub async fn play<A: GuessingAgent>(
    agent: &A,
    board: &Board,
    number: u32,
    mut conversation: Vec<ChatMessage>,
) -> Playthrough {
    let mut session = PlaySession::new(board);
    conversation.push(ChatMessage::user(session.opening_prompt()));

    while session.next_round() {
        let reply = match agent.reply(&conversation).await {
            Ok(reply) => reply,
            Err(err) => {
                err.trace();
                session.abort(AbortReason::AgentProtocol(err.to_string()));
                break;
            }
        };

        let candidate = split_reply(&reply.content);
        conversation.push(reply);

        let Some(turn) = session.submit(&candidate) else {
            break;
        };

        match &turn.kind {
            TurnKind::Rejected(err) => err.trace(),
            TurnKind::Scored { guess, outcome } => {
                debug!(round = session.rounds(), %guess, ?outcome, "scored guess")
            }
        }

        conversation.push(ChatMessage::user(turn.prompt));
    }

    if session.state().is_finished() {
        // lets the agent see how the game ended; the game counts either way
        match agent.reply(&conversation).await {
            Ok(reply) => conversation.push(reply),
            Err(err) => warn!(%err, "agent did not acknowledge the end of the game"),
        }
    }

    info!(
        state = ?session.state(),
        rounds = session.rounds(),
        correct = session.correct(),
        misses = session.misses(),
        "game over"
    );

    Playthrough {
        number,
        state: session.state().clone(),
        grid: session.grid(number),
        rounds: session.rounds(),
        conversation,
    }
}
