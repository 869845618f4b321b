use crate::map::Position;
use Direction::*;

pub const MIN_SNAKE_LENGTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise ring. Every rotation below is an index shift on it.
    pub const ALL: [Direction; 4] = [Up, Right, Down, Left];

    fn ring_index(self) -> usize {
        self as usize
    }

    fn rotate(self, quarter_turns: usize) -> Direction {
        Self::ALL[(self.ring_index() + quarter_turns) % 4]
    }

    pub fn clockwise(self) -> Direction {
        self.rotate(1)
    }

    pub fn opposite(self) -> Direction {
        self.rotate(2)
    }

    pub fn counterclockwise(self) -> Direction {
        self.rotate(3)
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
            Left => (-1, 0),
        }
    }
}

/// Anything that occupies the board the way the snake does.
pub trait Mover {
    fn head(&self) -> Position;
    /// Every occupied cell, head included.
    fn body(&self) -> &[Position];
    fn direction(&self) -> Direction;

    fn occupies(&self, pos: Position) -> bool {
        self.body().contains(&pos)
    }
}

/// The body is stored tail first, so the head is always the last element.
pub struct Snake {
    body: Vec<Position>,
    direction: Direction,
    grow_next_move: bool,
}

impl Snake {
    pub fn new(pos: Position, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();

        let body = (0..size.max(1) as i32).rev()
            .map(|i| Position::new(pos.x - dx * i, pos.y - dy * i))
            .collect();
        Snake { body, direction, grow_next_move: false }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn move_step(&mut self) -> Position {
        let new_head = self.head().step(self.direction);
        self.body.push(new_head);

        if self.grow_next_move {
            self.grow_next_move = false;
        } else {
            self.body.remove(0);
        }

        new_head
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        if new_direction != self.direction.opposite() {
            self.direction = new_direction;
        }
    }

    /// Turns without the reversal guard; used when leaving a gate.
    pub fn turn_to(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn grow(&mut self) {
        self.grow_next_move = true;
    }

    /// Drops the tail segment. Refuses (returning `false`) at minimum length.
    pub fn shrink(&mut self) -> bool {
        if self.body.len() <= MIN_SNAKE_LENGTH {
            return false;
        }
        self.body.remove(0);
        true
    }

    pub fn teleport_to(&mut self, pos: Position) {
        if let Some(head) = self.body.last_mut() {
            *head = pos;
        }
    }

    pub fn hits_itself(&self) -> bool {
        let head = self.head();
        self.body[..self.body.len() - 1].contains(&head)
    }

    pub fn reset(&mut self, pos: Position) {
        *self = Snake::new(pos, MIN_SNAKE_LENGTH, Right);
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

impl Mover for Snake {
    fn head(&self) -> Position {
        // `new` never builds an empty body and nothing removes the last segment
        self.body[self.body.len() - 1]
    }

    fn body(&self) -> &[Position] {
        &self.body
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_follow_the_clockwise_ring() {
        assert_eq!(Up.clockwise(), Right);
        assert_eq!(Right.clockwise(), Down);
        assert_eq!(Down.clockwise(), Left);
        assert_eq!(Left.clockwise(), Up);

        assert_eq!(Up.counterclockwise(), Left);
        assert_eq!(Right.counterclockwise(), Up);

        assert_eq!(Up.opposite(), Down);
        assert_eq!(Left.opposite(), Right);

        for dir in Direction::ALL {
            assert_eq!(dir.clockwise().counterclockwise(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.clockwise().clockwise(), dir.opposite());
        }
    }

    #[test]
    fn new_snake_trails_behind_its_head() {
        let snake = Snake::new(Position::new(10, 10), 3, Right);
        let expected = [Position::new(8, 10), Position::new(9, 10), Position::new(10, 10)];
        assert_eq!(snake.body(), &expected);
        assert_eq!(snake.head(), Position::new(10, 10));
        assert_eq!(snake.direction(), Right);
    }

    #[test]
    fn move_drops_tail_unless_growing() {
        let mut snake = Snake::new(Position::new(10, 10), 3, Right);
        snake.move_step();
        assert_eq!(snake.head(), Position::new(11, 10));
        assert_eq!(snake.len(), 3);

        snake.grow();
        snake.move_step();
        assert_eq!(snake.len(), 4);
        snake.move_step();
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn reversal_is_ignored_but_turn_to_forces() {
        let mut snake = Snake::new(Position::new(10, 10), 3, Right);
        snake.set_direction(Left);
        assert_eq!(snake.direction(), Right);
        snake.set_direction(Up);
        assert_eq!(snake.direction(), Up);
        snake.turn_to(Down);
        assert_eq!(snake.direction(), Down);
    }

    #[test]
    fn shrink_stops_at_minimum_length() {
        let mut snake = Snake::new(Position::new(10, 10), 4, Right);
        assert!(snake.shrink());
        assert_eq!(snake.len(), MIN_SNAKE_LENGTH);
        assert!(!snake.shrink());
        assert_eq!(snake.len(), MIN_SNAKE_LENGTH);
    }

    #[test]
    fn teleport_moves_only_the_head() {
        let mut snake = Snake::new(Position::new(10, 10), 3, Right);
        snake.teleport_to(Position::new(2, 2));
        assert_eq!(snake.head(), Position::new(2, 2));
        assert_eq!(snake.body()[1], Position::new(9, 10));
    }

    #[test]
    fn detects_self_collision() {
        let mut snake = Snake::new(Position::new(10, 10), 5, Right);
        assert!(!snake.hits_itself());
        snake.set_direction(Up);
        snake.move_step();
        snake.set_direction(Left);
        snake.move_step();
        snake.set_direction(Down);
        snake.move_step();
        assert!(snake.hits_itself());
    }
}
