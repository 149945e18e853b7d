// This code is part of Qiskit.
//
// (C) Copyright IBM 2024
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! The resolver from user-chosen subsystem labels to the direct-sum/tensor-product structure of
//! the density-matrix space.  A state space is an ordered list of tensor-product blocks, each an
//! ordered tuple of labels; the density matrix is block diagonal with one contiguous block per
//! tuple, and within a block the states factor as the tensor product of the labelled subsystems.
//!
//! Labels follow the conventional prefixes unless a dimension is given explicitly: a label
//! starting with `Q` is a qubit (dimension 2), a label starting with `L` is a single level
//! (dimension 1), and anything else defaults to a qubit.

use hashbrown::HashMap;

use crate::error::{ConstructionError, Result};

/// An immutable description of the state space.  Constructed once from user input and then
/// consulted read-only by the expression interpreter and the embedding engine.
#[derive(Clone, Debug)]
pub struct StateSpaceLabels {
    blocks: Vec<Vec<String>>,
    label_dims: HashMap<String, usize>,
    block_index: HashMap<String, usize>,
    block_dims: Vec<usize>,
}

impl StateSpaceLabels {
    /// Build from one label tuple per tensor-product block, using the prefix convention for
    /// dimensions.
    pub fn new(blocks: &[&[&str]]) -> Result<Self> {
        Self::with_label_dims(blocks, &[])
    }

    /// Build with explicit dimensions for some labels; anything not listed falls back to the
    /// prefix convention.
    pub fn with_label_dims(blocks: &[&[&str]], dims: &[(&str, usize)]) -> Result<Self> {
        let overrides: HashMap<&str, usize> = dims.iter().copied().collect();
        let mut label_dims = HashMap::new();
        let mut block_index = HashMap::new();
        let mut block_dims = Vec::with_capacity(blocks.len());
        let mut owned_blocks = Vec::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            let mut dim = 1;
            let mut owned = Vec::with_capacity(block.len());
            for &label in block.iter() {
                let label_dim = match overrides.get(label) {
                    Some(&dim) => dim,
                    None if label.starts_with('L') => 1,
                    None => 2,
                };
                if label_dim == 0 {
                    return Err(ConstructionError::InvalidBasis(format!(
                        "label '{label}' cannot have dimension 0"
                    )));
                }
                if label_dims.insert(label.to_owned(), label_dim).is_some() {
                    return Err(ConstructionError::DuplicateLabel(label.to_owned()));
                }
                block_index.insert(label.to_owned(), i);
                dim *= label_dim;
                owned.push(label.to_owned());
            }
            block_dims.push(dim);
            owned_blocks.push(owned);
        }
        Ok(Self {
            blocks: owned_blocks,
            label_dims,
            block_index,
            block_dims,
        })
    }

    /// Number of tensor-product blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The ordered labels of one block.
    pub fn block_labels(&self, block: usize) -> &[String] {
        &self.blocks[block]
    }

    /// Per-block state dimensions (the product of the member label dimensions).
    pub fn block_dims(&self) -> &[usize] {
        &self.block_dims
    }

    /// Total Hilbert-space dimension: the density matrix is `dm_dim x dm_dim` with everything
    /// off the diagonal blocks structurally zero.
    pub fn dm_dim(&self) -> usize {
        self.block_dims.iter().sum()
    }

    /// Dimension of the space of vectorized block-diagonal density matrices: the sum of the
    /// squared block dimensions.
    pub fn superop_dim(&self) -> usize {
        self.block_dims.iter().map(|d| d * d).sum()
    }

    /// Dimension of a single labelled subsystem.
    pub fn label_dim(&self, label: &str) -> Result<usize> {
        self.label_dims
            .get(label)
            .copied()
            .ok_or_else(|| ConstructionError::UnknownLabel(label.to_owned()))
    }

    /// Index of the tensor-product block a label belongs to.
    pub fn block_of(&self, label: &str) -> Result<usize> {
        self.block_index
            .get(label)
            .copied()
            .ok_or_else(|| ConstructionError::UnknownLabel(label.to_owned()))
    }

    /// Position of a label within its block's tuple.
    pub fn index_within_block(&self, label: &str) -> Result<usize> {
        let block = self.block_of(label)?;
        // The label is known to be a member of exactly this block.
        Ok(self.blocks[block]
            .iter()
            .position(|member| member == label)
            .unwrap())
    }

    /// The product of the dimensions of a label subset; sizes the local operator matrix of a
    /// primitive acting on those labels.
    pub fn product_dim(&self, labels: &[&str]) -> Result<usize> {
        let mut dim = 1;
        for &label in labels {
            dim *= self.label_dim(label)?;
        }
        Ok(dim)
    }
}
