//! Benchmark fixture lines of the form `<moves> <expected score>`

use crate::error::{Connect4Error, Result};

/// One solver regression case
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureCase {
    /// 1-based move string leading to the position
    pub moves: String,
    /// Exact score of the position for the player to move
    pub expected_score: i32,
}

impl FixtureCase {
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = || Connect4Error::MalformedFixture {
            line: line.to_string(),
        };
        let mut fields = line.split_whitespace();
        let moves = fields.next().ok_or_else(malformed)?;
        let expected_score = fields
            .next()
            .and_then(|score| score.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        if fields.next().is_some() {
            return Err(malformed());
        }
        Ok(Self {
            moves: moves.to_string(),
            expected_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case() {
        let case = FixtureCase::parse("2252576253462244111563365343671351441 -1").unwrap();
        assert_eq!(case.moves, "2252576253462244111563365343671351441");
        assert_eq!(case.expected_score, -1);
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in &["", "1234", "1234 x", "1234 3 extra"] {
            assert_eq!(
                FixtureCase::parse(line),
                Err(Connect4Error::MalformedFixture {
                    line: line.to_string()
                })
            );
        }
    }
}
