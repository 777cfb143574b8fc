//! ASCII board rendering for the step loop.

use gridbot_core::{Direction, GridPos, Level, StepSnapshot, Tile};

/// Renders the level grid with the snapshot's run-local state applied:
/// the agent as a facing arrow, collected stars and keys as floor, and
/// opened doors lowercased.
pub(crate) fn board(level: &Level, snapshot: &StepSnapshot) -> String {
    let mut rows = Vec::with_capacity(level.rows());
    for (y, row) in level.grid.iter().enumerate() {
        let mut line = String::with_capacity(row.len());
        for (x, tile) in row.iter().enumerate() {
            let position = GridPos::new(x as i32, y as i32);
            line.push(glyph(*tile, position, snapshot));
        }
        rows.push(line);
    }
    rows.join("\n")
}

fn glyph(tile: Tile, position: GridPos, snapshot: &StepSnapshot) -> char {
    if snapshot.pose.position() == position {
        return match snapshot.pose.facing() {
            Direction::Up => '^',
            Direction::Right => '>',
            Direction::Down => 'v',
            Direction::Left => '<',
        };
    }
    let key = position.key();
    match tile {
        Tile::Wall => '#',
        Tile::Empty | Tile::Start => '.',
        Tile::End => 'F',
        Tile::Hole => 'O',
        Tile::Star => {
            if snapshot.collected_stars.contains(&key) {
                '.'
            } else {
                '*'
            }
        }
        Tile::Key => {
            if snapshot.collected_keys.contains(&key) {
                '.'
            } else {
                'k'
            }
        }
        Tile::Door => {
            if snapshot.opened_doors.contains(&key) {
                'd'
            } else {
                'D'
            }
        }
    }
}
