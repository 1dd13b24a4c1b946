use crate::block::{Block, BookCheckout};
use crate::error::{LedgerError, Result};
use crate::hash;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Append-only sequence of sealed blocks, starting at a genesis block.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

/// A problem found while auditing a whole chain.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChainIssue {
    pub position: i64,
    pub message: String,
}

impl std::fmt::Display for ChainIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block {}: {}", self.position, self.message)
    }
}

impl Chain {
    /// Start a chain holding a freshly sealed genesis block.
    pub fn new() -> Result<Self> {
        Ok(Self {
            blocks: vec![Block::genesis()?],
        })
    }

    /// The most recently committed block.
    pub fn head(&self) -> &Block {
        // `new` guarantees a genesis block and nothing ever removes one.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true once constructed: a chain always holds its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Seal a block for `data` on top of the head and commit it.
    pub fn append(&mut self, data: BookCheckout) -> Result<&Block> {
        let candidate = Block::create(self.head(), data)?;
        self.append_block(candidate)
    }

    /// Commit an already sealed candidate if it is a valid successor of the head.
    ///
    /// A rejected candidate is dropped and the chain is left untouched.
    pub fn append_block(&mut self, candidate: Block) -> Result<&Block> {
        let head = self.head();
        if let Some(reason) = linkage_fault(&candidate, head) {
            warn!(
                position = candidate.position,
                head = head.position,
                %reason,
                "rejected candidate block"
            );
            return Err(LedgerError::LinkageRejected {
                position: candidate.position,
                reason,
            });
        }
        info!(
            position = candidate.position,
            hash = %candidate.hash,
            book_id = %candidate.data.book_id,
            "committed block"
        );
        self.blocks.push(candidate);
        Ok(self.head())
    }

    /// Ordered copy of every committed block.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Audit the whole chain: genesis shape, every self hash, every link.
    pub fn verify(&self) -> Vec<ChainIssue> {
        let mut issues = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            let mut report = |message: String| {
                issues.push(ChainIssue {
                    position: block.position,
                    message,
                })
            };
            if i == 0 {
                if block.position != 0 {
                    report("genesis position should be 0".into());
                }
                if !block.prev_hash.is_empty() {
                    report("genesis prev_hash should be empty".into());
                }
                if !block.verify() {
                    report("hash mismatch".into());
                }
            } else if let Some(reason) = linkage_fault(block, &self.blocks[i - 1]) {
                report(reason);
            }
        }
        issues
    }
}

/// Whether `candidate` is a valid successor of `head`.
///
/// Checks the previous-hash link, the position increment and the candidate's
/// own hash.
pub fn validate_linkage(candidate: &Block, head: &Block) -> bool {
    linkage_fault(candidate, head).is_none()
}

fn linkage_fault(candidate: &Block, head: &Block) -> Option<String> {
    if candidate.prev_hash != head.hash {
        return Some("prev_hash does not match head".into());
    }
    if candidate.position != head.position + 1 {
        return Some(format!(
            "position {} does not follow head position {}",
            candidate.position, head.position
        ));
    }
    if !hash::verify_hash(candidate, &candidate.hash) {
        return Some("hash mismatch".into());
    }
    None
}

/// Thread-safe handle to a [`Chain`].
///
/// Appends hold the write lock from reading the head to pushing the new
/// block, so they are linearized. Readers share the read lock.
#[derive(Debug, Clone)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new() -> Result<Self> {
        Ok(Self::from_chain(Chain::new()?))
    }

    pub fn from_chain(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Append `data` and return a copy of the committed block.
    pub fn append(&self, data: BookCheckout) -> Result<Block> {
        // The only mutation is a single push, so a poisoned chain is still consistent.
        let mut chain = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        chain.append(data).cloned()
    }

    pub fn append_block(&self, candidate: Block) -> Result<Block> {
        let mut chain = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        chain.append_block(candidate).cloned()
    }

    pub fn head(&self) -> Block {
        self.read(|c| c.head().clone())
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.read(Chain::snapshot)
    }

    pub fn verify(&self) -> Vec<ChainIssue> {
        self.read(Chain::verify)
    }

    pub fn len(&self) -> usize {
        self.read(Chain::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(Chain::is_empty)
    }

    fn read<T>(&self, f: impl FnOnce(&Chain) -> T) -> T {
        let chain = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&chain)
    }
}
