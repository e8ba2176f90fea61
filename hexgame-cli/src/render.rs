//! ASCII drawing of the rhombic board

use hexgame_core::{Board, Cell};

const BLACK_LABEL: &str = "BLACK";

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn symbol(cell: Cell) -> char {
    match cell {
        Cell::Empty => ' ',
        Cell::White => 'w',
        Cell::Black => 'b',
    }
}

fn column_letters(out: &mut String, indent: usize, size: usize) {
    pad(out, indent);
    let letters: Vec<String> = (0..size).map(|c| ((b'A' + c as u8) as char).to_string()).collect();
    out.push_str(&letters.join("   "));
    out.push('\n');
}

/// Draw the board with White's sides on top and bottom and Black's on the
/// left and right
pub fn render_board(board: &Board) -> String {
    let n = board.size();
    let mut out = String::new();

    // "BLACK" runs down the right edge around the middle rows
    let mut label = BLACK_LABEL.chars();
    let band = (n - 1) / 2..=(n - 1) / 2 + 2;
    let mut labelling = n % 2 == 1;

    out.push('\n');
    pad(&mut out, (n - 1) * 2);
    out.push_str("W H I T E\n");
    column_letters(&mut out, 4, n);

    pad(&mut out, 4);
    out.push_str(&vec!["_"; n].join("   "));
    out.push('\n');
    pad(&mut out, 3);
    out.push_str(&vec!["/ \\"; n].join("_"));
    out.push('\n');

    for row in 0..n {
        let number = row + 1;
        let indent = 2 + 2 * row;
        let in_band = band.contains(&number);

        pad(&mut out, indent - if number >= 10 { 3 } else { 2 });
        out.push_str(&format!("{} ", number));
        for &cell in board.row(row) {
            out.push_str(&format!("| {} ", symbol(cell)));
        }
        out.push_str(&format!("| {}", number));
        if in_band && labelling {
            if let Some(letter) = label.next() {
                pad(&mut out, if number >= 10 { 2 } else { 3 });
                out.push(letter);
            }
        }
        out.push('\n');

        pad(&mut out, indent);
        out.push_str(&" \\_/".repeat(n));
        out.push(' ');
        if row + 1 < n {
            out.push('\\');
        }
        if in_band {
            labelling = true;
            if let Some(letter) = label.next() {
                pad(&mut out, 5);
                out.push(letter);
            }
        }
        out.push('\n');
    }

    column_letters(&mut out, 2 + 2 * n, n);
    out.push('\n');
    out
}
