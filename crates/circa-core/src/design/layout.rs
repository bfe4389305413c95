//! Deterministic 2-D placement for blocks that have no position.
//!
//! Blocks are bucketed into columns by keyword match on their function
//! description; each column stacks its blocks top to bottom. Power blocks sit
//! on a fixed row below the processing column.

use serde::{Deserialize, Serialize};

use super::schema::{Block, Position};

const INPUT_KEYWORDS: &[&str] = &["input", "cv_input", "gate_input", "audio_input"];
const PROCESSING_KEYWORDS: &[&str] = &[
    "oscillator",
    "filter",
    "amplifier",
    "mixer",
    "waveshaper",
    "vca",
    "envelope",
];
const OUTPUT_KEYWORDS: &[&str] = &["output", "buffer", "audio_output"];
const POWER_KEYWORDS: &[&str] = &["power", "regulator", "supply"];

const ROW_STEP: i64 = 100;
const POWER_STEP: i64 = 50;
const POWER_ROW: i64 = 400;

/// Layout column a block is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    Input,
    Processing,
    Output,
    Power,
}

impl BlockCategory {
    pub const ALL: [BlockCategory; 4] = [
        BlockCategory::Input,
        BlockCategory::Processing,
        BlockCategory::Output,
        BlockCategory::Power,
    ];

    /// Checked in this order; the first match wins.
    const PRIORITY: [(BlockCategory, &'static [&'static str]); 4] = [
        (BlockCategory::Input, INPUT_KEYWORDS),
        (BlockCategory::Processing, PROCESSING_KEYWORDS),
        (BlockCategory::Output, OUTPUT_KEYWORDS),
        (BlockCategory::Power, POWER_KEYWORDS),
    ];

    pub fn column(self) -> i64 {
        match self {
            Self::Input => 0,
            Self::Processing | Self::Power => 300,
            Self::Output => 600,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Processing => "Processing",
            Self::Output => "Output",
            Self::Power => "Power",
        }
    }

    /// Vertical distance between consecutive blocks in this column.
    pub fn step(self) -> i64 {
        match self {
            Self::Power => POWER_STEP,
            _ => ROW_STEP,
        }
    }
}

/// Classifies a function description by case-insensitive substring match.
///
/// Descriptions matching no keyword fall into `Processing`.
pub fn classify(function: &str) -> BlockCategory {
    let function = function.to_lowercase();
    BlockCategory::PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| function.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(BlockCategory::Processing)
}

/// Running vertical offset per column.
#[derive(Debug, Default)]
struct ColumnCursor {
    input: i64,
    processing: i64,
    output: i64,
    power: i64,
}

impl ColumnCursor {
    fn slot(&mut self, category: BlockCategory) -> &mut i64 {
        match category {
            BlockCategory::Input => &mut self.input,
            BlockCategory::Processing => &mut self.processing,
            BlockCategory::Output => &mut self.output,
            BlockCategory::Power => &mut self.power,
        }
    }

    fn place(&mut self, category: BlockCategory) -> Position {
        let slot = self.slot(category);
        let y = match category {
            // The power counter still advances but the row is fixed.
            BlockCategory::Power => POWER_ROW,
            _ => *slot,
        };
        *slot += category.step();
        Position {
            x: category.column(),
            y,
        }
    }
}

/// Returns a copy of `blocks` with every missing position filled in.
///
/// Blocks that already declare a position are copied unchanged and do not
/// advance any column counter.
pub fn assign_positions(blocks: &[Block]) -> Vec<Block> {
    let mut cursor = ColumnCursor::default();
    blocks
        .iter()
        .map(|block| {
            let mut placed = block.clone();
            if placed.position.is_none() {
                let category = classify(&placed.function);
                let position = cursor.place(category);
                tracing::trace!(
                    block_id = %placed.id,
                    ?category,
                    x = position.x,
                    y = position.y,
                    "Placed block"
                );
                placed.position = Some(position);
            }
            placed
        })
        .collect()
}

/// Discards every declared position and lays all blocks out from scratch.
pub fn relayout(blocks: &[Block]) -> Vec<Block> {
    let cleared: Vec<Block> = blocks
        .iter()
        .cloned()
        .map(|mut block| {
            block.position = None;
            block
        })
        .collect();
    assign_positions(&cleared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, function: &str) -> Block {
        Block::new(id, id.to_uppercase(), function)
    }

    fn positions(blocks: &[Block]) -> Vec<(i64, i64)> {
        blocks
            .iter()
            .map(|b| {
                let p = b.position.unwrap();
                (p.x, p.y)
            })
            .collect()
    }

    #[test]
    fn test_classify_priority_and_default() {
        assert_eq!(classify("CV Input stage"), BlockCategory::Input);
        assert_eq!(classify("Voltage controlled Filter"), BlockCategory::Processing);
        assert_eq!(classify("Output buffer"), BlockCategory::Output);
        assert_eq!(classify("Power regulator"), BlockCategory::Power);
        // "input" outranks "amplifier".
        assert_eq!(classify("input amplifier"), BlockCategory::Input);
        // "output" outranks "supply".
        assert_eq!(classify("supply output rail"), BlockCategory::Output);
        assert_eq!(classify("mystery box"), BlockCategory::Processing);
    }

    #[test]
    fn test_processing_blocks_stack_in_middle_column() {
        let placed = assign_positions(&[
            block("osc", "oscillator core"),
            block("vcf", "ladder filter"),
        ]);
        assert_eq!(positions(&placed), vec![(300, 0), (300, 100)]);
    }

    #[test]
    fn test_power_row_is_fixed() {
        let placed = assign_positions(&[
            block("psu", "power supply"),
            block("osc", "oscillator"),
            block("reg", "5V regulator"),
        ]);
        assert_eq!(positions(&placed), vec![(300, 400), (300, 0), (300, 400)]);
    }

    #[test]
    fn test_columns_advance_independently() {
        let placed = assign_positions(&[
            block("in1", "audio input"),
            block("mix", "mixer"),
            block("in2", "gate input"),
            block("out", "audio output"),
            block("misc", "unknown thing"),
        ]);
        assert_eq!(
            positions(&placed),
            vec![(0, 0), (300, 0), (0, 100), (600, 0), (300, 100)]
        );
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let blocks = vec![block("a", "input"), block("b", "filter"), block("c", "buffer")];
        assert_eq!(positions(&assign_positions(&blocks)), positions(&assign_positions(&blocks)));
    }

    #[test]
    fn test_declared_positions_untouched() {
        let blocks = vec![
            block("fixed", "oscillator").with_position(42, 7),
            block("free", "oscillator"),
        ];
        let placed = assign_positions(&blocks);
        assert_eq!(positions(&placed), vec![(42, 7), (300, 0)]);
        // Input is not mutated.
        assert_eq!(blocks[1].position, None);
    }

    #[test]
    fn test_assign_is_idempotent_once_placed() {
        let once = assign_positions(&[block("a", "filter"), block("b", "vca")]);
        let twice = assign_positions(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_relayout_overrides_declared_positions() {
        let blocks = vec![
            block("a", "filter").with_position(999, 999),
            block("b", "envelope"),
        ];
        assert_eq!(positions(&relayout(&blocks)), vec![(300, 0), (300, 100)]);
    }
}
