//! Text rendering of minimap frames

use pano_engine::foundation::math::Point2;
use pano_engine::minimap::MinimapFrame;

/// Grid cell of a canvas point
fn cell(frame: &MinimapFrame, point: Point2, cols: usize, rows: usize) -> (usize, usize) {
    let col = (point.x / frame.width * (cols - 1) as f32).round();
    let row = (point.y / frame.height * (rows - 1) as f32).round();
    (
        col.clamp(0.0, (cols - 1) as f32) as usize,
        row.clamp(0.0, (rows - 1) as f32) as usize,
    )
}

fn plot_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), glyph: char) {
    let (dx, dy) = (to.0 as f32 - from.0 as f32, to.1 as f32 - from.1 as f32);
    let steps = dx.abs().max(dy.abs()).max(1.0) as usize;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let col = (from.0 as f32 + dx * t).round() as usize;
        let row = (from.1 as f32 + dy * t).round() as usize;
        if let Some(slot) = grid.get_mut(row).and_then(|line| line.get_mut(col)) {
            if *slot == ' ' {
                *slot = glyph;
            }
        }
    }
}

/// Draw a frame into a `cols` x `rows` box
///
/// Edges are `.`, scenes `o`, the current scene `@` and its heading `*`.
pub fn render_minimap(frame: &MinimapFrame, cols: usize, rows: usize) -> String {
    let (cols, rows) = (cols.max(2), rows.max(2));
    let mut grid = vec![vec![' '; cols]; rows];

    for point in &frame.points {
        let (col, row) = cell(frame, point.position, cols, rows);
        grid[row][col] = if point.current { '@' } else { 'o' };
    }
    if let Some(heading) = &frame.heading {
        let from = cell(frame, heading.from, cols, rows);
        let to = cell(frame, heading.to, cols, rows);
        plot_line(&mut grid, from, to, '*');
    }
    for edge in &frame.edges {
        let from = cell(frame, edge.from, cols, rows);
        let to = cell(frame, edge.to, cols, rows);
        plot_line(&mut grid, from, to, '.');
    }

    let border = format!("+{}+", "-".repeat(cols));
    let mut out = String::with_capacity((cols + 3) * (rows + 2));
    out.push_str(&border);
    out.push('\n');
    for line in grid {
        out.push('|');
        out.extend(line);
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}
