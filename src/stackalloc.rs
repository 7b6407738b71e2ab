// Copyright 2025 Lars Brubaker
// License: MIT
//
// Stack-of-blocks allocator backing the segment array of an open polygon.
//
// In Rust, the raw pointer bookkeeping of a block allocator is replaced by
// typed Vec-backed blocks and index-range handles. At most one allocation is
// "current" (resizable); everything below it in its block is sealed and never
// moves until the arena is reset.

use log::{debug, trace};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("arena could not grow to hold {requested} elements")]
    Exhausted { requested: usize },
}

/// Growth policy for a [`StackAlloc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackAllocConfig {
    /// Smallest block the arena will create, in elements.
    pub min_block_len: usize,
    /// Upper bound on the total number of elements across all blocks.
    /// `None` means limited only by the system allocator.
    pub max_len: Option<usize>,
}

impl Default for StackAllocConfig {
    fn default() -> Self {
        Self {
            min_block_len: 64,
            max_len: None,
        }
    }
}

/// Handle to a region of one block. Only meaningful for the arena that
/// produced it, and only until that region is freed or the arena is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    block: usize,
    start: usize,
    len: usize,
}

impl Allocation {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn block(&self) -> usize {
        self.block
    }
}

struct Block<T> {
    data: Vec<T>,
    /// First unsealed slot. The current allocation, if it lives here, starts at `top`.
    top: usize,
}

impl<T> Block<T> {
    fn free_len(&self) -> usize {
        self.data.len() - self.top
    }
}

pub struct StackAlloc<T> {
    blocks: Vec<Block<T>>,
    current: Option<Allocation>,
    config: StackAllocConfig,
    total: usize,
}

impl<T: Copy + Default> StackAlloc<T> {
    pub fn new() -> Self {
        Self::with_config(StackAllocConfig::default())
    }

    pub fn with_config(config: StackAllocConfig) -> Self {
        Self {
            blocks: Vec::new(),
            current: None,
            config,
            total: 0,
        }
    }

    pub fn config(&self) -> StackAllocConfig {
        self.config
    }

    /// Seal the current allocation and start a new one of `len` elements.
    pub fn alloc(&mut self, len: usize) -> Result<Allocation, AllocError> {
        self.done();
        self.place(len, None)
    }

    /// Resize the current allocation, in place when its block has room.
    /// Otherwise the contents move to a fresh region and the old one is
    /// abandoned. With no current allocation this is [`alloc`](Self::alloc).
    pub fn realloc(&mut self, len: usize) -> Result<Allocation, AllocError> {
        let cur = match self.current {
            Some(cur) => cur,
            None => return self.alloc(len),
        };

        if self.blocks[cur.block].data.len() - cur.start >= len {
            let resized = Allocation { len, ..cur };
            self.current = Some(resized);
            return Ok(resized);
        }

        let moved = self.place(len, Some(cur.block))?;
        let n = cur.len.min(len);
        let (src, dst) = pair_mut(&mut self.blocks, cur.block, moved.block);
        dst.data[moved.start..moved.start + n].copy_from_slice(&src.data[cur.start..cur.start + n]);
        trace!(
            "stackalloc: moved {} elements from block {} to block {}",
            n,
            cur.block,
            moved.block
        );
        Ok(moved)
    }

    /// Seal the current allocation; it can no longer grow or shrink.
    pub fn done(&mut self) {
        if let Some(cur) = self.current.take() {
            self.blocks[cur.block].top = cur.start + cur.len;
        }
    }

    /// Drop the current allocation without sealing it; its space is reused.
    pub fn free(&mut self) {
        self.current = None;
    }

    /// Release a sealed allocation if it is the topmost one in its block.
    /// Passing the current allocation frees it. Returns false when the region
    /// is buried under later allocations and cannot be released.
    pub fn pop(&mut self, alloc: &Allocation) -> bool {
        if let Some(cur) = self.current {
            if cur == *alloc {
                self.free();
                return true;
            }
            if cur.block == alloc.block {
                return false;
            }
        }
        match self.blocks.get_mut(alloc.block) {
            Some(block) if block.top == alloc.start + alloc.len => {
                block.top = alloc.start;
                true
            }
            _ => false,
        }
    }

    /// Release every block.
    pub fn reset(&mut self) {
        if !self.blocks.is_empty() {
            debug!(
                "stackalloc: reset, releasing {} blocks ({} elements)",
                self.blocks.len(),
                self.total
            );
        }
        self.blocks.clear();
        self.current = None;
        self.total = 0;
    }

    pub fn current(&self) -> Option<Allocation> {
        self.current
    }

    pub fn slice(&self, alloc: &Allocation) -> &[T] {
        &self.blocks[alloc.block].data[alloc.start..alloc.start + alloc.len]
    }

    pub fn slice_mut(&mut self, alloc: &Allocation) -> &mut [T] {
        &mut self.blocks[alloc.block].data[alloc.start..alloc.start + alloc.len]
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total elements across all blocks.
    pub fn capacity(&self) -> usize {
        self.total
    }

    /// Elements in sealed allocations plus the current one.
    pub fn used(&self) -> usize {
        let sealed: usize = self.blocks.iter().map(|b| b.top).sum();
        sealed + self.current.map_or(0, |c| c.len)
    }

    fn place(&mut self, len: usize, exclude: Option<usize>) -> Result<Allocation, AllocError> {
        let block = match self.find_block(len, exclude) {
            Some(idx) => idx,
            None => self.grow(len)?,
        };
        let alloc = Allocation {
            block,
            start: self.blocks[block].top,
            len,
        };
        self.current = Some(alloc);
        Ok(alloc)
    }

    fn find_block(&self, len: usize, exclude: Option<usize>) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(idx, block)| Some(*idx) != exclude && block.free_len() >= len)
            .map(|(idx, _)| idx)
    }

    /// Add a block with room for at least `len` elements. Asks for double
    /// that first and halves the request toward `len` on failure.
    fn grow(&mut self, len: usize) -> Result<usize, AllocError> {
        let mut want = len
            .saturating_mul(2)
            .max(self.config.min_block_len)
            .max(1);
        loop {
            if let Some(idx) = self.try_add_block(want) {
                return Ok(idx);
            }
            if want <= len {
                debug!("stackalloc: cannot grow to {} elements", len);
                return Err(AllocError::Exhausted { requested: len });
            }
            trace!("stackalloc: block of {} elements refused, retrying smaller", want);
            want = (want / 2).max(len);
        }
    }

    fn try_add_block(&mut self, cap: usize) -> Option<usize> {
        if let Some(max) = self.config.max_len {
            if self.total.saturating_add(cap) > max {
                return None;
            }
        }
        let mut data = Vec::new();
        if data.try_reserve_exact(cap).is_err() {
            return None;
        }
        data.resize(cap, T::default());
        let idx = self.blocks.len();
        self.blocks.push(Block { data, top: 0 });
        self.total += cap;
        debug!("stackalloc: new block #{} holding {} elements", idx, cap);
        Some(idx)
    }
}

impl<T: Copy + Default> Default for StackAlloc<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_mut<T>(blocks: &mut [Block<T>], src: usize, dst: usize) -> (&Block<T>, &mut Block<T>) {
    debug_assert_ne!(src, dst);
    if src < dst {
        let (lo, hi) = blocks.split_at_mut(dst);
        (&lo[src], &mut hi[0])
    } else {
        let (lo, hi) = blocks.split_at_mut(src);
        (&hi[0], &mut lo[dst])
    }
}
