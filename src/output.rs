//! Destinations for the text emitted by `print` instructions.

/// Interface to the output surface of the executor.
pub trait Output {
    /// Called when a `print` instruction is executed.
    ///
    /// # Parameters
    /// - `row`: Value of the first variable operand. Larger numbers move down.
    /// - `col`: Value of the second variable operand. Larger numbers move right.
    /// - `text`: The text operand, never containing whitespace.
    fn emit(&mut self, row: i32, col: i32, text: &str);
}

impl<T> Output for &mut T where T: Output + ?Sized {
    fn emit(&mut self, row: i32, col: i32, text: &str) {
        (**self).emit(row, col, text)
    }
}

/// An output that writes every emission as a `row col text` line to the standard output.
pub struct StdOutput;

impl Output for StdOutput {
    fn emit(&mut self, row: i32, col: i32, text: &str) {
        println!("{} {} {}", row, col, text);
    }
}

/// A single recorded call to [Output::emit].
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub row: i32,
    pub col: i32,
    pub text: String,
}

/// An output for testing purposes. Records every emission in order.
#[derive(Debug, Default)]
pub struct TestOutput {
    emissions: Vec<Emission>,
}

impl TestOutput {
    pub fn new() -> TestOutput {
        TestOutput {
            emissions: Vec::new(),
        }
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.emissions[..]
    }

    /// The emissions as `(row, col, text)` tuples.
    pub fn calls(&self) -> Vec<(i32, i32, &str)> {
        self.emissions.iter()
            .map(|e| (e.row, e.col, e.text.as_str()))
            .collect()
    }
}

impl Output for TestOutput {
    fn emit(&mut self, row: i32, col: i32, text: &str) {
        self.emissions.push(Emission {
            row,
            col,
            text: text.to_string(),
        });
    }
}

/// A coordinate addressed character grid.
///
/// Text is written starting at `(row, col)` with `(0, 0)` being the upper left corner. Text that
/// does not fit is clipped at the right edge, emissions outside the grid are dropped.
#[derive(Debug, Clone)]
pub struct Screen {
    cols: usize,
    cells: Vec<Vec<char>>,
}

impl Screen {
    pub fn new(rows: usize, cols: usize) -> Screen {
        Screen {
            cols,
            cells: vec![vec![' '; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn char_at(&self, row: usize, col: usize) -> Option<char> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Renders the grid with trailing spaces and trailing empty rows removed.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.cells.iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();

        while lines.last().map(String::is_empty).unwrap_or(false) {
            lines.pop();
        }

        lines.join("\n")
    }
}

impl Output for Screen {
    fn emit(&mut self, row: i32, col: i32, text: &str) {
        if row < 0 || col < 0 {
            return;
        }

        let cols = self.cols;
        let col = col as usize;

        let cells = match self.cells.get_mut(row as usize) {
            Some(cells) => cells,
            None => return,
        };

        for (cell, c) in cells[col.min(cols)..].iter_mut().zip(text.chars()) {
            *cell = c;
        }
    }
}

#[test]
fn test_output_records_calls() {
    fn emit_two<O: Output>(mut output: O) {
        output.emit(1, 2, "a");
        output.emit(-1, 0, "b");
    }

    let mut output = TestOutput::new();
    emit_two(&mut output);

    assert_eq!(output.calls(), vec![(1, 2, "a"), (-1, 0, "b")]);
}

#[test]
fn test_screen_writes_and_clips() {
    let mut screen = Screen::new(3, 5);

    assert_eq!((screen.rows(), screen.cols()), (3, 5));

    screen.emit(0, 0, "hi");
    screen.emit(1, 3, "there");
    screen.emit(5, 0, "gone");
    screen.emit(0, -1, "gone");
    screen.emit(2, 9, "gone");

    assert_eq!(screen.char_at(1, 3), Some('t'));
    assert_eq!(screen.char_at(1, 4), Some('h'));
    assert_eq!(screen.render(), "hi\n   th");
}

#[test]
fn test_screen_overwrites() {
    let mut screen = Screen::new(1, 10);

    screen.emit(0, 0, "aaaa");
    screen.emit(0, 2, "b");

    assert_eq!(screen.render(), "aaba");
}
