// src/data/loader.rs
//! Fixed-window batching of an encoded corpus
//!
//! The corpus is cut into `batch_size` contiguous row streams; batch `k`
//! takes columns `[k*seq, (k+1)*seq)` of every row, so the recurrent state
//! returned by one batch is the right starting state for the next.

use crate::error::{CharnnError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub inputs: Vec<Vec<usize>>,
    pub targets: Vec<Vec<usize>>,
}

pub struct BatchLoader {
    inputs: Vec<usize>,
    targets: Vec<usize>,
    batch_size: usize,
    sequence_length: usize,
    num_batches: usize,
    pointer: usize,
}

impl BatchLoader {
    pub fn new(encoded: &[usize], batch_size: usize, sequence_length: usize) -> Result<Self> {
        let window = batch_size * sequence_length;
        let num_batches = if window == 0 { 0 } else { encoded.len() / window };
        if num_batches == 0 {
            return Err(CharnnError::NotEnoughData {
                symbols: encoded.len(),
                batch_size,
                sequence_length,
            });
        }

        let inputs = encoded[..num_batches * window].to_vec();
        // next symbol of each position; the last one wraps to the start
        let mut targets = inputs[1..].to_vec();
        targets.push(inputs[0]);

        Ok(Self {
            inputs,
            targets,
            batch_size,
            sequence_length,
            num_batches,
            pointer: 0,
        })
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn reset(&mut self) {
        self.pointer = 0;
    }

    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.pointer >= self.num_batches {
            return None;
        }
        let row_len = self.num_batches * self.sequence_length;
        let start = self.pointer * self.sequence_length;
        let slice = |data: &[usize]| -> Vec<Vec<usize>> {
            (0..self.batch_size)
                .map(|row| {
                    let offset = row * row_len + start;
                    data[offset..offset + self.sequence_length].to_vec()
                })
                .collect()
        };

        let batch = Batch {
            inputs: slice(&self.inputs),
            targets: slice(&self.targets),
        };
        self.pointer += 1;
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enough_data() {
        let err = BatchLoader::new(&[0, 1, 2], 2, 2).err();
        assert!(matches!(err, Some(CharnnError::NotEnoughData { symbols: 3, .. })));
    }

    #[test]
    fn test_targets_shifted_with_wraparound() {
        let corpus: Vec<usize> = (0..8).collect();
        let mut loader = BatchLoader::new(&corpus, 1, 4).unwrap();
        assert_eq!(loader.num_batches(), 2);

        let first = loader.next_batch().unwrap();
        assert_eq!(first.inputs, vec![vec![0, 1, 2, 3]]);
        assert_eq!(first.targets, vec![vec![1, 2, 3, 4]]);

        let second = loader.next_batch().unwrap();
        assert_eq!(second.inputs, vec![vec![4, 5, 6, 7]]);
        assert_eq!(second.targets, vec![vec![5, 6, 7, 0]]);

        assert!(loader.next_batch().is_none());
    }

    #[test]
    fn test_rows_are_contiguous_streams() {
        // 13 symbols, 2 rows x 3 columns per batch -> 2 batches, 1 symbol dropped
        let corpus: Vec<usize> = (0..13).collect();
        let mut loader = BatchLoader::new(&corpus, 2, 3).unwrap();
        assert_eq!(loader.num_batches(), 2);

        let first = loader.next_batch().unwrap();
        assert_eq!(first.inputs, vec![vec![0, 1, 2], vec![6, 7, 8]]);
        let second = loader.next_batch().unwrap();
        assert_eq!(second.inputs, vec![vec![3, 4, 5], vec![9, 10, 11]]);
        assert_eq!(second.targets, vec![vec![4, 5, 6], vec![10, 11, 0]]);
    }

    #[test]
    fn test_reset() {
        let corpus: Vec<usize> = (0..4).collect();
        let mut loader = BatchLoader::new(&corpus, 1, 4).unwrap();
        let first = loader.next_batch().unwrap();
        assert!(loader.next_batch().is_none());
        loader.reset();
        assert_eq!(loader.next_batch().unwrap(), first);
    }
}
