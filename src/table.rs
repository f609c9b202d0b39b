use pad::PadStr;

/// A bordered text table written to stderr.
pub struct Table {
    ncol: usize,
    rows: Vec<Vec<String>>,
    headless: bool,
}

impl Table {
    pub fn with_capacity(size: usize, headless: bool) -> Table {
        Table {
            ncol: 0,
            rows: Vec::with_capacity(size + 1),
            headless,
        }
    }

    /// The first row added is the header. Rows shorter than the header are
    /// padded with empty cells, longer ones are cut.
    pub fn add(&mut self, mut row: Vec<String>) {
        if self.ncol == 0 {
            self.ncol = row.len();
            if self.headless {
                return;
            }
        } else {
            row.resize(self.ncol, String::new());
        }
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        (0..self.ncol)
            .map(|coli| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(coli))
                    .map(|cell| console::measure_text_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn render(self) -> Vec<String> {
        let widths = self.widths();

        let mut split = String::from("+");
        for width in widths.iter() {
            split.push_str(&"-".repeat(width + 2));
            split.push('+');
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        lines.push(split.clone());
        for (rowi, row) in self.rows.into_iter().enumerate() {
            let mut line = String::from("|");
            for (cell, width) in row.into_iter().zip(widths.iter()) {
                let text = cell.pad_to_width_with_alignment(*width, pad::Alignment::Left);
                line.push_str(&format!(" {text} |"));
            }
            lines.push(line);

            if !self.headless && rowi == 0 {
                lines.push(split.clone());
            }
        }
        lines.push(split);
        lines
    }

    pub fn show(self) {
        for line in self.render() {
            eprintln!("{line}");
        }
    }
}
