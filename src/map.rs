use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Contents of a single map cell. The discriminants are the numeric codes
/// the board has always used.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty = 0,
    Wall = 1,
    ImmuneWall = 2,
    SnakeHead = 3,
    SnakeBody = 4,
    GrowthItem = 5,
    PoisonItem = 6,
    Gate = 7,
    SpeedItem = 8,
    TemporaryWall = 9,
}

impl Cell {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Cell> {
        use Cell::*;
        Some(match code {
            0 => Empty,
            1 => Wall,
            2 => ImmuneWall,
            3 => SnakeHead,
            4 => SnakeBody,
            5 => GrowthItem,
            6 => PoisonItem,
            7 => Gate,
            8 => SpeedItem,
            9 => TemporaryWall,
            _ => return None,
        })
    }

    /// Walls a gate may be carved into.
    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall | Cell::ImmuneWall)
    }

    /// Cells the snake dies on.
    pub fn is_solid(self) -> bool {
        matches!(self, Cell::Wall | Cell::ImmuneWall | Cell::TemporaryWall)
    }

    /// Stamps that get repainted every tick.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Cell::SnakeHead
                | Cell::SnakeBody
                | Cell::GrowthItem
                | Cell::PoisonItem
                | Cell::SpeedItem
                | Cell::TemporaryWall
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

pub struct GameMap {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl GameMap {
    /// Creates an empty board fenced by immune walls.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = vec![Cell::Empty; (width * height) as usize];
        let mut map = GameMap { width, height, cells };

        for x in 0..width {
            map.set(Position::new(x, 0), Cell::ImmuneWall);
            map.set(Position::new(x, height - 1), Cell::ImmuneWall);
        }
        for y in 0..height {
            map.set(Position::new(0, y), Cell::ImmuneWall);
            map.set(Position::new(width - 1, y), Cell::ImmuneWall);
        }

        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    pub fn is_interior(&self, pos: Position) -> bool {
        pos.x > 0 && pos.x < self.width - 1 && pos.y > 0 && pos.y < self.height - 1
    }

    /// True for any in-bounds cell on the outermost ring.
    pub fn is_outer(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_interior(pos)
    }

    pub fn is_corner(&self, pos: Position) -> bool {
        let x_edge = pos.x == 0 || pos.x == self.width - 1;
        let y_edge = pos.y == 0 || pos.y == self.height - 1;
        self.in_bounds(pos) && x_edge && y_edge
    }

    /// Outer edges the cell lies on, in top, bottom, left, right order.
    /// Corners sit on two edges, interior cells on none.
    pub fn outer_edges(&self, pos: Position) -> Vec<Edge> {
        if !self.in_bounds(pos) {
            return vec![];
        }

        let mut edges = Vec::with_capacity(2);
        if pos.y == 0 {
            edges.push(Edge::Top);
        }
        if pos.y == self.height - 1 {
            edges.push(Edge::Bottom);
        }
        if pos.x == 0 {
            edges.push(Edge::Left);
        }
        if pos.x == self.width - 1 {
            edges.push(Edge::Right);
        }
        edges
    }

    pub fn same_outer_wall(&self, a: Position, b: Position) -> bool {
        let b_edges = self.outer_edges(b);
        self.outer_edges(a).iter().any(|edge| b_edges.contains(edge))
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn interior_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |pos| self.is_interior(*pos))
    }

    pub fn clear_interior(&mut self) {
        let interior: Vec<Position> = self.interior_positions().collect();
        for pos in interior {
            self.set(pos, Cell::Empty);
        }
    }

    /// Wipes snake, item and temporary wall stamps so they can be repainted.
    pub fn reset_transient(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.is_transient()) {
            *cell = Cell::Empty;
        }
    }

    /// Finds a spot where a fresh snake of length 3 facing right fits, with
    /// one free cell ahead of its head.
    pub fn find_safe_position(&self) -> Option<Position> {
        let fits = |pos: Position| {
            (-2..=1).all(|dx| self.is_interior(Position::new(pos.x + dx, pos.y))
                && self.is_empty(Position::new(pos.x + dx, pos.y)))
        };

        let center = Position::new(self.width / 2, self.height / 2);
        if center.x >= 3 && fits(center) {
            return Some(center);
        }

        self.interior_positions().find(|pos| pos.x >= 3 && fits(*pos))
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_is_fenced_by_immune_walls() {
        let map = GameMap::new(31, 31);
        assert_eq!(map.get(Position::new(0, 0)), Some(Cell::ImmuneWall));
        assert_eq!(map.get(Position::new(30, 15)), Some(Cell::ImmuneWall));
        assert_eq!(map.get(Position::new(15, 30)), Some(Cell::ImmuneWall));
        assert_eq!(map.get(Position::new(15, 15)), Some(Cell::Empty));
    }

    #[test]
    fn off_map_access_is_absorbed() {
        let mut map = GameMap::new(10, 10);
        assert_eq!(map.get(Position::new(-1, 3)), None);
        assert_eq!(map.get(Position::new(3, 10)), None);
        assert!(!map.set(Position::new(10, 0), Cell::Wall));
        assert!(!map.is_outer(Position::new(-1, -1)));
        assert!(!map.is_corner(Position::new(-1, -1)));
        assert!(map.outer_edges(Position::new(42, 0)).is_empty());
    }

    #[test]
    fn cell_codes_are_stable() {
        assert_eq!(Cell::Wall.code(), 1);
        assert_eq!(Cell::ImmuneWall.code(), 2);
        assert_eq!(Cell::Gate.code(), 7);
        assert_eq!(Cell::TemporaryWall.code(), 9);
        for code in 0..10 {
            assert_eq!(Cell::from_code(code).map(Cell::code), Some(code));
        }
        assert_eq!(Cell::from_code(10), None);
    }

    #[test]
    fn boundary_classification() {
        let map = GameMap::new(31, 21);
        assert!(map.is_corner(Position::new(30, 20)));
        assert!(!map.is_corner(Position::new(30, 19)));
        assert!(map.is_outer(Position::new(30, 19)));
        assert!(!map.is_outer(Position::new(29, 19)));
        assert_eq!(map.outer_edges(Position::new(0, 0)), vec![Edge::Top, Edge::Left]);
        assert_eq!(map.outer_edges(Position::new(5, 20)), vec![Edge::Bottom]);
    }

    #[test]
    fn same_outer_wall_only_for_shared_edges() {
        let map = GameMap::new(31, 31);
        assert!(map.same_outer_wall(Position::new(3, 0), Position::new(20, 0)));
        assert!(map.same_outer_wall(Position::new(30, 3), Position::new(30, 27)));
        assert!(!map.same_outer_wall(Position::new(3, 0), Position::new(0, 3)));
        assert!(!map.same_outer_wall(Position::new(3, 0), Position::new(3, 5)));
    }

    #[test]
    fn reset_transient_keeps_walls_and_gates() {
        let mut map = GameMap::new(10, 10);
        map.set(Position::new(2, 2), Cell::SnakeHead);
        map.set(Position::new(3, 2), Cell::TemporaryWall);
        map.set(Position::new(4, 2), Cell::Wall);
        map.set(Position::new(5, 2), Cell::Gate);

        map.reset_transient();

        assert_eq!(map.get(Position::new(2, 2)), Some(Cell::Empty));
        assert_eq!(map.get(Position::new(3, 2)), Some(Cell::Empty));
        assert_eq!(map.get(Position::new(4, 2)), Some(Cell::Wall));
        assert_eq!(map.get(Position::new(5, 2)), Some(Cell::Gate));
    }

    #[test]
    fn safe_position_avoids_walls() {
        let mut map = GameMap::new(31, 31);
        assert_eq!(map.find_safe_position(), Some(Position::new(15, 15)));

        map.set(Position::new(14, 15), Cell::Wall);
        let pos = map.find_safe_position().unwrap();
        assert!(pos.x >= 3);
        for dx in -2..=1 {
            assert!(map.is_empty(Position::new(pos.x + dx, pos.y)));
        }
    }

    #[test]
    fn steps_follow_direction() {
        let p = Position::new(4, 4);
        assert_eq!(p.step(Direction::Up), Position::new(4, 3));
        assert_eq!(p.step(Direction::Right), Position::new(5, 4));
        assert_eq!(p.manhattan(Position::new(1, 8)), 7);
    }
}
