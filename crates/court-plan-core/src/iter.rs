// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Lazy iterator over all `K`-element index combinations of `0..n`, in
/// lexicographic order.
///
/// Combinations are produced on demand; nothing is materialized up front.
/// The sequence is finite and fused: once exhausted it stays exhausted.
#[derive(Debug, Clone)]
pub struct IndexCombinations<const K: usize> {
    n: usize,
    cursor: [usize; K],
    done: bool,
}

impl<const K: usize> IndexCombinations<K> {
    pub fn new(n: usize) -> Self {
        let mut cursor = [0usize; K];
        for (i, c) in cursor.iter_mut().enumerate() {
            *c = i;
        }
        Self {
            n,
            cursor,
            done: K == 0 || n < K,
        }
    }
}

impl<const K: usize> Iterator for IndexCombinations<K> {
    type Item = [usize; K];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let out = self.cursor;

        // Advance the rightmost index that still has room, then reset the
        // tail to the positions directly after it.
        let mut i = K;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.cursor[i] + (K - i) < self.n {
                self.cursor[i] += 1;
                for j in i + 1..K {
                    self.cursor[j] = self.cursor[j - 1] + 1;
                }
                break;
            }
        }
        Some(out)
    }
}

impl<const K: usize> std::iter::FusedIterator for IndexCombinations<K> {}
