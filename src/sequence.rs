//! Pure reordering primitives for the priority sequence.
//!
//! Every operation here works on an ordered list of opaque elements and a
//! cursor position, mutates in place, and returns the new cursor where one
//! is relevant. Out-of-range positions and boundary moves are no-ops, never
//! errors, so callers can feed them raw cursor state.

/// Where a new element lands relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPos {
    Top,
    AtCursor,
    AfterCursor,
    Bottom,
}

/// Resolve an [`InsertPos`] against the current list length and cursor.
pub fn resolve_insert_index(len: usize, cursor: usize, pos: InsertPos) -> usize {
    match pos {
        InsertPos::Top => 0,
        InsertPos::AtCursor => cursor.min(len),
        InsertPos::AfterCursor => {
            if len == 0 {
                0
            } else {
                (cursor + 1).min(len)
            }
        }
        InsertPos::Bottom => len,
    }
}

/// Insert `element` at `index`, clamped to the list bounds.
pub fn insert_at<T>(seq: &mut Vec<T>, element: T, index: usize) {
    let index = index.min(seq.len());
    seq.insert(index, element);
}

/// Move the element at `pos` to the front. Returns the new cursor (0).
pub fn move_to_top<T>(seq: &mut [T], pos: usize) -> usize {
    if pos == 0 || pos >= seq.len() {
        return 0;
    }
    seq[..=pos].rotate_right(1);
    0
}

/// Swap the element at `pos` with the one above it. No-op at the top.
pub fn move_up<T>(seq: &mut [T], pos: usize) -> usize {
    if pos == 0 || pos >= seq.len() {
        return pos;
    }
    seq.swap(pos, pos - 1);
    pos - 1
}

/// Swap the element at `pos` with the one below it. No-op at the bottom.
pub fn move_down<T>(seq: &mut [T], pos: usize) -> usize {
    if seq.is_empty() || pos >= seq.len() - 1 {
        return pos;
    }
    seq.swap(pos, pos + 1);
    pos + 1
}

/// Remove and return the element at `pos`, if it exists.
pub fn remove_at<T>(seq: &mut Vec<T>, pos: usize) -> Option<T> {
    if pos >= seq.len() {
        return None;
    }
    Some(seq.remove(pos))
}
