//! 0/1 selection over the catalog, one bit per action in catalog order.

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    words: Vec<u64>,
    len: usize,
}

impl Assignment {
    /// All-zero assignment over `len` actions.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Low `len` bits of `mask`, bit i = action i.
    pub fn from_mask(mask: u32, len: usize) -> Self {
        let mut a = Self::new(len);
        for i in 0..len.min(32) {
            if (mask >> i) & 1 == 1 {
                a.set(i, true);
            }
        }
        a
    }

    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut a = Self::new(len);
        for i in indices {
            a.set(i, true);
        }
        a
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    pub fn set(&mut self, i: usize, on: bool) {
        debug_assert!(i < self.len);
        let bit = 1u64 << (i % WORD_BITS);
        if on {
            self.words[i / WORD_BITS] |= bit;
        } else {
            self.words[i / WORD_BITS] &= !bit;
        }
    }

    pub fn flip(&mut self, i: usize) {
        debug_assert!(i < self.len);
        self.words[i / WORD_BITS] ^= 1u64 << (i % WORD_BITS);
    }

    pub fn count_selected(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Selected indices in ascending order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.get(i))
    }
}
