//! SPDX-FileCopyrightText: 2025 `CyberDeco`, 1989 Haruhiko Okumura (`LZSS.C`, public domain)
//!
//! SPDX-License-Identifier: MIT
//!
//! LZSS compression as used by AIL archive entries
//!
//! A 4 KiB sliding window with 18-byte lookahead. The window starts primed
//! with spaces up to [`INIT_POS`], and matches are located with a binary
//! search tree over window positions.
//!
//! Bitstream: groups of one control byte followed by up to eight tokens.
//! Control bits are consumed LSB first; a clear bit is a one-byte literal,
//! a set bit is a two-byte match `[pos & 0xFF][((pos >> 4) & 0xF0) | (len - 3)]`.
//! There is no end marker, the stream ends when the input does.

/// Size of the ring buffer
pub const WINDOW_SIZE: usize = 4096;

/// Upper limit for match length
pub const MAX_MATCH: usize = 18;

/// Matches this long or shorter are emitted as literals
pub const THRESHOLD: usize = 2;

/// Initial write position in the ring buffer
pub const INIT_POS: usize = 0xFEE;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// First of the 256 per-byte tree roots, one past the last window position
const ROOT_BASE: usize = WINDOW_SIZE + 1;

/// Window positions plus the 257 slots above them (spare slot + roots)
const TREE_NODES: usize = WINDOW_SIZE + 257;

/// Decompress an LZSS stream.
///
/// Truncated input is not an error: decoding stops at the first token that
/// cannot be read in full and returns what was produced so far.
#[must_use]
pub fn decompress(data: &[u8]) -> Vec<u8> {
    let mut ring = [0u8; WINDOW_SIZE];
    ring[..INIT_POS].fill(b' ');
    let mut r = INIT_POS;

    let mut output = Vec::with_capacity(data.len().saturating_mul(2));
    let mut input = data.iter().copied();
    let mut flags: u32 = 0;

    loop {
        flags >>= 1;
        if flags & 0x100 == 0 {
            let Some(c) = input.next() else { break };
            // high byte counts down the eight tokens of this group
            flags = u32::from(c) | 0xFF00;
        }

        if flags & 1 == 0 {
            let Some(c) = input.next() else { break };
            output.push(c);
            ring[r] = c;
            r = (r + 1) & WINDOW_MASK;
        } else {
            let Some(lo) = input.next() else { break };
            let Some(hi) = input.next() else { break };

            let position = usize::from(lo) | (usize::from(hi & 0xF0) << 4);
            let length = usize::from(hi & 0x0F) + THRESHOLD + 1;

            for k in 0..length {
                let c = ring[(position + k) & WINDOW_MASK];
                output.push(c);
                ring[r] = c;
                r = (r + 1) & WINDOW_MASK;
            }
        }
    }

    output
}

/// Compress data into an LZSS stream.
///
/// Output is deterministic for a given input. Empty input produces empty output.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compress(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut tree = MatchTree::new();
    let mut input = data.iter().copied();
    let mut output = Vec::with_capacity(data.len() / 2 + 17);

    // control byte plus up to eight two-byte tokens
    let mut code = [0u8; 17];
    let mut code_len = 1;
    let mut mask: u8 = 1;

    let mut s = 0;
    let mut r = INIT_POS;

    let mut len = 0;
    while len < MAX_MATCH {
        let Some(c) = input.next() else { break };
        tree.text[r + len] = c;
        len += 1;
    }

    for i in 1..=MAX_MATCH {
        tree.insert(r - i);
    }
    tree.insert(r);

    loop {
        if tree.match_length > len {
            tree.match_length = len;
        }

        if tree.match_length <= THRESHOLD {
            tree.match_length = 1;
            code[code_len] = tree.text[r];
            code_len += 1;
        } else {
            code[0] |= mask;
            code[code_len] = (tree.match_position & 0xFF) as u8;
            code[code_len + 1] = (((tree.match_position >> 4) & 0xF0)
                | (tree.match_length - (THRESHOLD + 1))) as u8;
            code_len += 2;
        }

        mask <<= 1;
        if mask == 0 {
            output.extend_from_slice(&code[..code_len]);
            code[0] = 0;
            code_len = 1;
            mask = 1;
        }

        let last_match_length = tree.match_length;
        let mut i = 0;
        while i < last_match_length {
            let Some(c) = input.next() else { break };
            tree.delete(s);
            tree.text[s] = c;
            if s < MAX_MATCH - 1 {
                tree.text[s + WINDOW_SIZE] = c;
            }
            s = (s + 1) & WINDOW_MASK;
            r = (r + 1) & WINDOW_MASK;
            tree.insert(r);
            i += 1;
        }

        // input exhausted: keep sliding until the lookahead drains
        while i < last_match_length {
            i += 1;
            tree.delete(s);
            s = (s + 1) & WINDOW_MASK;
            r = (r + 1) & WINDOW_MASK;
            len -= 1;
            if len != 0 {
                tree.insert(r);
            }
        }

        if len == 0 {
            break;
        }
    }

    if code_len > 1 {
        output.extend_from_slice(&code[..code_len]);
    }

    output
}

/// Binary search tree over window positions, keyed by the bytes that follow
/// each position.
///
/// Nodes live in flat arrays addressed by index. Indices below
/// [`WINDOW_SIZE`] are window positions; `ROOT_BASE + b` is the root of the
/// subtree of positions whose first byte is `b`.
struct MatchTree {
    /// Window text, with the first `MAX_MATCH - 1` bytes mirrored past the end
    text: Vec<u8>,
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
    match_position: usize,
    match_length: usize,
}

impl MatchTree {
    fn new() -> Self {
        let mut text = vec![0u8; WINDOW_SIZE + MAX_MATCH - 1];
        text[..INIT_POS].fill(b' ');

        Self {
            text,
            left: vec![None; TREE_NODES],
            right: vec![None; TREE_NODES],
            parent: vec![None; TREE_NODES],
            match_position: 0,
            match_length: 0,
        }
    }

    /// Insert window position `r`, recording the longest match seen on the way down.
    ///
    /// A node with an identical `MAX_MATCH`-byte key is replaced by `r`, so the
    /// tree keeps at most one node per key and always the most recent one.
    fn insert(&mut self, r: usize) {
        let mut cmp: i32 = 1;
        let mut p = ROOT_BASE + usize::from(self.text[r]);
        self.left[r] = None;
        self.right[r] = None;
        self.match_length = 0;

        loop {
            if cmp >= 0 {
                match self.right[p] {
                    Some(next) => p = next,
                    None => {
                        self.right[p] = Some(r);
                        self.parent[r] = Some(p);
                        return;
                    }
                }
            } else {
                match self.left[p] {
                    Some(next) => p = next,
                    None => {
                        self.left[p] = Some(r);
                        self.parent[r] = Some(p);
                        return;
                    }
                }
            }

            let mut i = 1;
            while i < MAX_MATCH {
                cmp = i32::from(self.text[r + i]) - i32::from(self.text[p + i]);
                if cmp != 0 {
                    break;
                }
                i += 1;
            }

            if i > self.match_length {
                self.match_position = p;
                self.match_length = i;
                if i >= MAX_MATCH {
                    break;
                }
            }
        }

        // full-length duplicate: r takes over p's place in the tree
        self.parent[r] = self.parent[p];
        self.left[r] = self.left[p];
        self.right[r] = self.right[p];
        if let Some(child) = self.left[p] {
            self.parent[child] = Some(r);
        }
        if let Some(child) = self.right[p] {
            self.parent[child] = Some(r);
        }
        if let Some(up) = self.parent[p] {
            if self.right[up] == Some(p) {
                self.right[up] = Some(r);
            } else {
                self.left[up] = Some(r);
            }
        }
        self.parent[p] = None;
    }

    /// Remove window position `p` from the tree. No-op if it is not linked.
    fn delete(&mut self, p: usize) {
        let Some(up) = self.parent[p] else { return };

        let replacement = match (self.left[p], self.right[p]) {
            (left, None) => left,
            (None, right) => right,
            (Some(left), Some(right)) => {
                let mut q = left;
                if self.right[q].is_some() {
                    // rightmost node of the left subtree
                    while let Some(next) = self.right[q] {
                        q = next;
                    }
                    if let Some(q_parent) = self.parent[q] {
                        self.right[q_parent] = self.left[q];
                        if let Some(q_left) = self.left[q] {
                            self.parent[q_left] = Some(q_parent);
                        }
                    }
                    self.left[q] = Some(left);
                    self.parent[left] = Some(q);
                }
                self.right[q] = Some(right);
                self.parent[right] = Some(q);
                Some(q)
            }
        };

        if let Some(q) = replacement {
            self.parent[q] = Some(up);
        }
        if self.right[up] == Some(p) {
            self.right[up] = replacement;
        } else {
            self.left[up] = replacement;
        }
        self.parent[p] = None;
    }
}
