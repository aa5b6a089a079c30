//! Tesseract TSV output
//!
//! Converts `tesseract <image> stdout tsv` output into the block → line →
//! element hierarchy. Columns:
//!
//! ```text
//! level page_num block_num par_num line_num word_num left top width height conf text
//! ```
//!
//! Level 2 rows are blocks, level 4 rows are lines and level 5 rows are
//! words. Paragraphs (level 3) are folded into their block. Rows arrive in
//! reading order; word rows whose block/line ids differ from the current
//! ones open a new block/line even if the structural row was missing.

use super::types::{OcrError, RecognitionResult, TextBlock, TextElement, TextLine};
use crate::geometry::Rect;

const COLUMN_COUNT: usize = 12;

const LEVEL_BLOCK: u32 = 2;
const LEVEL_LINE: u32 = 4;
const LEVEL_WORD: u32 = 5;

struct Row<'a> {
    level: u32,
    block_num: u32,
    par_num: u32,
    line_num: u32,
    frame: Rect,
    text: &'a str,
}

fn parse_row(line: &str, line_no: usize) -> Result<Row<'_>, OcrError> {
    let columns: Vec<&str> = line.splitn(COLUMN_COUNT, '\t').collect();
    if columns.len() < COLUMN_COUNT - 1 {
        return Err(OcrError::InvalidOutput(format!(
            "TSV line {} has {} columns, expected {}",
            line_no,
            columns.len(),
            COLUMN_COUNT
        )));
    }

    let int = |idx: usize| -> Result<u32, OcrError> {
        columns[idx].trim().parse::<u32>().map_err(|e| {
            OcrError::InvalidOutput(format!("TSV line {} column {}: {}", line_no, idx + 1, e))
        })
    };
    let float = |idx: usize| -> Result<f64, OcrError> {
        columns[idx].trim().parse::<f64>().map_err(|e| {
            OcrError::InvalidOutput(format!("TSV line {} column {}: {}", line_no, idx + 1, e))
        })
    };

    Ok(Row {
        level: int(0)?,
        block_num: int(2)?,
        par_num: int(3)?,
        line_num: int(4)?,
        frame: Rect::new(float(6)?, float(7)?, float(8)?, float(9)?),
        text: columns.get(11).map(|t| t.trim()).unwrap_or(""),
    })
}

#[derive(Default)]
struct PendingBlock {
    block_num: u32,
    frame: Option<Rect>,
    lines: Vec<TextLine>,
    line_key: Option<(u32, u32)>,
}

impl PendingBlock {
    fn new(block_num: u32, frame: Option<Rect>) -> Self {
        Self {
            block_num,
            frame,
            ..Default::default()
        }
    }

    fn open_line(&mut self, key: (u32, u32), frame: Option<Rect>) {
        let mut line = TextLine::new(Vec::new());
        line.frame = frame;
        self.lines.push(line);
        self.line_key = Some(key);
    }

    fn finish(self) -> Option<TextBlock> {
        let lines: Vec<TextLine> = self
            .lines
            .into_iter()
            .filter(|l| !l.elements.is_empty())
            .collect();
        if lines.is_empty() {
            return None;
        }
        let mut block = TextBlock::from_lines(lines);
        if let Some(frame) = self.frame {
            block.frame = frame;
        }
        Some(block)
    }
}

/// Parse Tesseract TSV output into a recognition result.
pub fn parse_tsv(output: &str) -> Result<RecognitionResult, OcrError> {
    let mut blocks = Vec::new();
    let mut current: Option<PendingBlock> = None;

    for (idx, line) in output.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() || line.starts_with("level") {
            continue;
        }

        let row = parse_row(line, line_no)?;
        match row.level {
            LEVEL_BLOCK => {
                if let Some(done) = current.take().and_then(PendingBlock::finish) {
                    blocks.push(done);
                }
                current = Some(PendingBlock::new(row.block_num, Some(row.frame)));
            }
            LEVEL_LINE | LEVEL_WORD => {
                let needs_block = current
                    .as_ref()
                    .map_or(true, |b| b.block_num != row.block_num);
                if needs_block {
                    if let Some(done) = current.take().and_then(PendingBlock::finish) {
                        blocks.push(done);
                    }
                    current = Some(PendingBlock::new(row.block_num, None));
                }
                let Some(block) = current.as_mut() else {
                    continue;
                };

                let key = (row.par_num, row.line_num);
                if row.level == LEVEL_LINE {
                    block.open_line(key, Some(row.frame));
                    continue;
                }

                if block.line_key != Some(key) {
                    block.open_line(key, None);
                }
                if row.text.is_empty() {
                    continue;
                }
                if let Some(line) = block.lines.last_mut() {
                    line.elements.push(TextElement::new(row.text, row.frame));
                }
            }
            _ => {}
        }
    }

    if let Some(done) = current.take().and_then(PendingBlock::finish) {
        blocks.push(done);
    }

    Ok(RecognitionResult::new(blocks))
}
