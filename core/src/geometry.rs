//! Integer grid geometry. No floating point anywhere in this module.

use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = other.x as i64 - self.x as i64;
        let dy = other.y as i64 - self.y as i64;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn chebyshev_distance(self, other: Position) -> i64 {
        let dx = (other.x as i64 - self.x as i64).abs();
        let dy = (other.y as i64 - self.y as i64).abs();
        dx.max(dy)
    }

    /// `true` when `other` lies within the closed disc of radius `max_distance`.
    #[inline]
    pub fn in_range(self, other: Position, max_distance: i64) -> bool {
        self.distance_squared(other) <= max_distance * max_distance
    }

    /// Walks one cell at a time toward `target`, staying within `max_step`
    /// cells (Chebyshev) of `self`.
    pub fn step_toward(self, target: Position, max_step: i64) -> Position {
        assert!(max_step >= 0, "step budget must be non-negative, got {max_step}");
        greedy_walk(self, target, |candidate| {
            self.chebyshev_distance(candidate) <= max_step
        })
    }

    /// Walks toward `target` while staying inside the Euclidean disc of
    /// radius `max_distance` around `self`.
    pub fn reach_toward(self, target: Position, max_distance: i64) -> Position {
        assert!(
            max_distance >= 0,
            "move radius must be non-negative, got {max_distance}"
        );
        greedy_walk(self, target, |candidate| {
            self.in_range(candidate, max_distance)
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[inline]
pub fn distance_squared(a: Position, b: Position) -> i64 {
    a.distance_squared(b)
}

#[inline]
pub fn in_range(a: Position, b: Position, max_distance: i64) -> bool {
    a.in_range(b, max_distance)
}

#[inline]
pub fn step_toward(from: Position, to: Position, max_step: i64) -> Position {
    from.step_toward(to, max_step)
}

// Tie order is fixed: diagonal, then x only, then y only, then halt.
fn greedy_walk<F>(from: Position, to: Position, allowed: F) -> Position
where
    F: Fn(Position) -> bool,
{
    let mut cur = from;
    while cur != to {
        let dx = (to.x - cur.x).signum();
        let dy = (to.y - cur.y).signum();

        let diagonal = Position::new(cur.x + dx, cur.y + dy);
        if allowed(diagonal) {
            cur = diagonal;
            continue;
        }

        let x_only = Position::new(cur.x + dx, cur.y);
        if dx != 0 && allowed(x_only) {
            cur = x_only;
            continue;
        }

        let y_only = Position::new(cur.x, cur.y + dy);
        if dy != 0 && allowed(y_only) {
            cur = y_only;
            continue;
        }

        break;
    }
    cur
}

/// How the hero is allowed to travel in a single move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRule {
    /// At most `speed` king-moves on the grid.
    #[default]
    Grid,
    /// Anywhere within Euclidean distance `speed`.
    Euclidean,
}

impl MoveRule {
    pub fn advance(self, from: Position, to: Position, speed: i64) -> Position {
        match self {
            Self::Grid => from.step_toward(to, speed),
            Self::Euclidean => from.reach_toward(to, speed),
        }
    }

    pub fn allows(self, from: Position, to: Position, speed: i64) -> bool {
        match self {
            Self::Grid => from.chebyshev_distance(to) <= speed,
            Self::Euclidean => from.in_range(to, speed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Euclidean => "euclidean",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Position = Position::new(0, 0);

    #[test]
    fn range_is_inclusive_on_the_boundary() {
        assert_eq!(distance_squared(ORIGIN, Position::new(3, 4)), 25);
        assert!(in_range(ORIGIN, Position::new(3, 4), 5));
        assert!(!in_range(ORIGIN, Position::new(3, 4), 4));
        assert!(in_range(ORIGIN, ORIGIN, 0));
    }

    #[test]
    fn step_toward_stops_after_budget_on_an_axis() {
        assert_eq!(step_toward(ORIGIN, Position::new(3, 0), 2), Position::new(2, 0));
    }

    #[test]
    fn step_toward_prefers_diagonal() {
        assert_eq!(step_toward(ORIGIN, Position::new(2, 2), 1), Position::new(1, 1));
    }

    #[test]
    fn step_toward_falls_back_to_single_axis_once_diagonal_is_exhausted() {
        // Two diagonals reach (2, -2); the remaining y offset then runs out of budget.
        assert_eq!(
            step_toward(ORIGIN, Position::new(2, -5), 2),
            Position::new(2, -2)
        );
        assert_eq!(
            step_toward(ORIGIN, Position::new(5, 1), 3),
            Position::new(3, 1)
        );
    }

    #[test]
    fn step_toward_reaches_target_inside_budget() {
        let target = Position::new(-2, 1);
        assert_eq!(step_toward(ORIGIN, target, 10), target);
        assert_eq!(step_toward(target, target, 0), target);
    }

    #[test]
    fn zero_budget_never_moves() {
        assert_eq!(step_toward(ORIGIN, Position::new(4, 4), 0), ORIGIN);
        assert_eq!(ORIGIN.reach_toward(Position::new(4, 4), 0), ORIGIN);
    }

    #[test]
    fn reach_toward_respects_euclidean_radius() {
        // (1, 1) is sqrt(2) away, so a radius of 1 only allows the x step.
        assert_eq!(
            ORIGIN.reach_toward(Position::new(2, 2), 1),
            Position::new(1, 0)
        );
        assert_eq!(
            ORIGIN.reach_toward(Position::new(10, 0), 3),
            Position::new(3, 0)
        );
        let end = ORIGIN.reach_toward(Position::new(10, 10), 5);
        assert!(ORIGIN.in_range(end, 5));
        assert_eq!(end, Position::new(4, 3));
    }

    #[test]
    fn move_rule_advance_stays_legal() {
        let target = Position::new(17, -9);
        for speed in 0..8 {
            for rule in [MoveRule::Grid, MoveRule::Euclidean] {
                let end = rule.advance(ORIGIN, target, speed);
                assert!(rule.allows(ORIGIN, end, speed), "rule={rule:?} speed={speed}");
            }
        }
    }

    #[test]
    #[should_panic]
    fn negative_step_budget_is_rejected() {
        step_toward(ORIGIN, Position::new(1, 1), -1);
    }
}
