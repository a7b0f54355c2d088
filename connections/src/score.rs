use crate::{
    board::{Board, Color},
    guess::Guess,
};

/// Result of checking one valid guess against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Correct { group: usize, name: String },
    OneAway,
    Incorrect,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Correct { group, .. } => Color::from_index(*group),
            _ => None,
        }
    }
}

/// Compares a guess with each category in color order, stopping at the
/// first full or three-word match.
pub fn classify(guess: &Guess, board: &Board) -> Outcome {
    for (group, category) in board.categories().iter().enumerate() {
        let overlap = guess.iter().filter(|word| category.contains(word)).count();

        match overlap {
            4 => {
                return Outcome::Correct {
                    group,
                    name: category.name().to_owned(),
                }
            }
            3 => return Outcome::OneAway,
            _ => (),
        }
    }

    Outcome::Incorrect
}

/// One transcript row: each guessed word's category color.
pub fn icon_row(guess: &Guess, board: &Board) -> String {
    guess
        .iter()
        .filter_map(|word| board.color_of(word))
        .map(Color::icon)
        .collect()
}

#[cfg(test)]
mod tests {
    use paste::paste;
    use pretty_assertions::assert_eq;

    use super::{classify, icon_row, Outcome};
    use crate::{board::Board, guess::guess, solution::test_solution};

    fn board() -> Board {
        Board::from_solution(&test_solution()).expect("valid solution")
    }

    macro_rules! classify {
        ($($name:ident: $a:ident $b:ident $c:ident $d:ident => $outcome:expr;)+) => {
            paste! {
                $(
                    #[test]
                    fn [<classify_ $name>]() {
                        let guess = guess([
                            stringify!($a),
                            stringify!($b),
                            stringify!($c),
                            stringify!($d),
                        ]);
                        assert_eq!(classify(&guess, &board()), $outcome);
                    }
                )+
            }
        };
    }

    classify! {
        correct_first: PIKE BASS CARP SOLE => Outcome::Correct { group: 0, name: "FISH".to_owned() };
        correct_last: EYE SNOW FOOT BASKET => Outcome::Correct { group: 3, name: "___BALL".to_owned() };
        one_away: MARS VENUS SATURN TAB => Outcome::OneAway;
        two_two: MARS VENUS TAB SHIFT => Outcome::Incorrect;
        spread: MARS TAB BASS EYE => Outcome::Incorrect;
    }

    #[test]
    fn correct_color() {
        let outcome = classify(&guess(["MARS", "VENUS", "SATURN", "MERCURY"]), &board());
        assert_eq!(outcome.color().map(|color| color.name()), Some("blue"));
        assert!(outcome.is_correct());
    }

    #[test]
    fn icons() {
        assert_eq!(
            icon_row(&guess(["MARS", "TAB", "BASS", "EYE"]), &board()),
            "🟦🟩🟨🟪"
        );
    }
}
