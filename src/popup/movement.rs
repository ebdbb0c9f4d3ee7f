use std::ops::RangeInclusive;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Truncated towards zero, the way window coordinates are handed out.
    pub fn to_pixels(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Resting,
    Gliding {
        origin: Point,
        target: Point,
        steps: u32,
        step: u32,
    },
}

/// Result of one glide step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glide {
    pub position: Point,
    pub arrived: bool,
}

/// Straight-line wander between random targets. The owner calls
/// [`Movement::retarget`], then [`Movement::glide`] once per step until
/// `arrived`, pauses, and starts over.
#[derive(Debug, Clone)]
pub struct Movement {
    position: Point,
    phase: Phase,
}

impl Movement {
    pub fn new(start: Point) -> Self {
        Self {
            position: start,
            phase: Phase::Resting,
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> Point {
        self.position
    }

    #[cfg(test)]
    pub fn is_gliding(&self) -> bool {
        matches!(self.phase, Phase::Gliding { .. })
    }

    /// Picks a target in `[0, max_x] × [0, max_y]` and a step count from
    /// `steps`. Returns the chosen target.
    pub fn retarget<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        max_x: i32,
        max_y: i32,
        steps: RangeInclusive<u32>,
    ) -> Point {
        let target = Point::new(
            rng.random_range(0..=max_x.max(0)) as f64,
            rng.random_range(0..=max_y.max(0)) as f64,
        );
        let steps = rng.random_range(steps);
        self.set_target(target, steps);
        target
    }

    pub fn set_target(&mut self, target: Point, steps: u32) {
        self.phase = Phase::Gliding {
            origin: self.position,
            target,
            steps: steps.max(1),
            step: 0,
        };
    }

    /// Advances one step along the line from the origin. `None` while resting.
    pub fn glide(&mut self) -> Option<Glide> {
        let Phase::Gliding {
            origin,
            target,
            steps,
            step,
        } = &mut self.phase
        else {
            return None;
        };

        *step += 1;
        if *step >= *steps {
            self.position = *target;
            self.phase = Phase::Resting;
            return Some(Glide {
                position: self.position,
                arrived: true,
            });
        }

        let t = *step as f64 / *steps as f64;
        self.position = Point::new(
            origin.x + (target.x - origin.x) * t,
            origin.y + (target.y - origin.y) * t,
        );
        Some(Glide {
            position: self.position,
            arrived: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn reaches_target_after_exactly_the_chosen_steps() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut movement = Movement::new(Point::new(37.0, 911.0));
            let target = movement.retarget(&mut rng, 1620, 780, 50..=100);

            let mut taken = 0;
            let last = loop {
                let glide = movement.glide().unwrap();
                taken += 1;
                if glide.arrived {
                    break glide;
                }
            };

            assert!((50..=100).contains(&taken));
            assert!((last.position.x - target.x).abs() < 1e-9);
            assert!((last.position.y - target.y).abs() < 1e-9);
            assert!(!movement.is_gliding());
        }
    }

    #[test]
    fn steps_are_linear_from_the_origin() {
        let mut movement = Movement::new(Point::new(0.0, 100.0));
        movement.set_target(Point::new(100.0, 0.0), 4);

        let positions: Vec<_> = std::iter::from_fn(|| movement.glide())
            .map(|g| g.position)
            .collect();
        assert_eq!(
            positions,
            vec![
                Point::new(25.0, 75.0),
                Point::new(50.0, 50.0),
                Point::new(75.0, 25.0),
                Point::new(100.0, 0.0),
            ]
        );
    }

    #[test]
    fn resting_movement_does_not_glide() {
        let mut movement = Movement::new(Point::new(1.0, 2.0));
        assert!(movement.glide().is_none());
        assert_eq!(movement.position(), Point::new(1.0, 2.0));
    }

    #[test]
    fn zero_steps_arrive_immediately() {
        let mut movement = Movement::new(Point::new(0.0, 0.0));
        movement.set_target(Point::new(5.0, 5.0), 0);
        let glide = movement.glide().unwrap();
        assert!(glide.arrived);
        assert_eq!(glide.position, Point::new(5.0, 5.0));
    }

    #[test]
    fn targets_stay_inside_the_area() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut movement = Movement::new(Point::new(0.0, 0.0));
        for _ in 0..200 {
            let target = movement.retarget(&mut rng, 300, 200, 50..=100);
            assert!((0.0..=300.0).contains(&target.x));
            assert!((0.0..=200.0).contains(&target.y));
        }
        let degenerate = movement.retarget(&mut rng, -10, -10, 50..=100);
        assert_eq!(degenerate, Point::new(0.0, 0.0));
    }
}
