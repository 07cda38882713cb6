//! # Cursor Derivation and Poll Ranges
//!
//! Cursors are not persisted across restarts; a cold start re-derives the
//! starting point as "current height minus a fixed lookback window".

use shared_types::BlockHeight;

/// Starting cursor block for a fresh watch: `height - lookback`, saturating
/// at the genesis block.
#[must_use]
pub fn initial_cursor_block(current_height: BlockHeight, lookback_blocks: u64) -> BlockHeight {
    current_height.saturating_sub(lookback_blocks)
}

/// The block range one poll cycle covers: `[cursor, height]` inclusive.
///
/// Returns `None` when the chain has not advanced past the cursor — the
/// cycle is a no-op and no backward or empty range is ever queried.
#[must_use]
pub fn poll_range(
    cursor_block: BlockHeight,
    current_height: BlockHeight,
) -> Option<(BlockHeight, BlockHeight)> {
    if current_height <= cursor_block {
        return None;
    }
    Some((cursor_block, current_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_cursor_applies_lookback() {
        assert_eq!(initial_cursor_block(500, 100), 400);
    }

    #[test]
    fn test_initial_cursor_saturates_at_genesis() {
        assert_eq!(initial_cursor_block(40, 100), 0);
    }

    #[test]
    fn test_no_range_when_chain_has_not_advanced() {
        assert_eq!(poll_range(100, 100), None);
        assert_eq!(poll_range(100, 90), None);
    }

    #[test]
    fn test_range_is_inclusive_at_both_ends() {
        assert_eq!(poll_range(100, 115), Some((100, 115)));
        assert_eq!(poll_range(0, 7), Some((0, 7)));
    }
}
