use crate::error::Result;
use crate::hash::{self, BlockHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single book checkout, the payload carried by every block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BookCheckout {
    pub book_id: String,
    pub user: String,
    pub checkout_date: String,
    pub is_genesis: bool,
}

impl BookCheckout {
    pub fn new(book_id: &str, user: &str, checkout_date: &str) -> Self {
        Self {
            book_id: book_id.into(),
            user: user.into(),
            checkout_date: checkout_date.into(),
            is_genesis: false,
        }
    }

    /// Marker payload for the first block of a chain.
    pub fn genesis() -> Self {
        Self {
            is_genesis: true,
            ..Self::default()
        }
    }
}

/// A sealed ledger entry linked to its predecessor by hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Index in the chain; 0 for genesis.
    pub position: i64,
    pub data: BookCheckout,
    /// When the block was sealed.
    pub timestamp: DateTime<Utc>,
    pub hash: BlockHash,
    /// Hash of the preceding block (empty for genesis).
    pub prev_hash: BlockHash,
}

impl Block {
    /// Build and seal the successor of `previous`.
    pub fn create(previous: &Block, data: BookCheckout) -> Result<Self> {
        Self::create_at(previous, data, Utc::now())
    }

    /// Like [`Block::create`] with an explicit timestamp (for testing / determinism).
    pub fn create_at(
        previous: &Block,
        data: BookCheckout,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let mut block = Self {
            position: previous.position + 1,
            data,
            timestamp,
            hash: BlockHash::new(),
            prev_hash: previous.hash.clone(),
        };
        hash::seal(&mut block)?;
        Ok(block)
    }

    /// The first block of a new chain, built from an empty predecessor at position -1.
    pub fn genesis() -> Result<Self> {
        Self::create(&Self::origin(), BookCheckout::genesis())
    }

    /// Check the stored hash against a fresh recomputation.
    pub fn verify(&self) -> bool {
        hash::verify_hash(self, &self.hash)
    }

    pub fn is_genesis(&self) -> bool {
        self.data.is_genesis
    }

    fn origin() -> Self {
        Self {
            position: -1,
            data: BookCheckout::default(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            hash: BlockHash::new(),
            prev_hash: BlockHash::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_block_shape() {
        let g = Block::genesis().unwrap();
        assert_eq!(g.position, 0);
        assert!(g.prev_hash.is_empty());
        assert_eq!(g.hash.len(), 64);
        assert!(g.is_genesis());
        assert!(g.data.book_id.is_empty());
        assert!(g.verify());
    }

    #[test]
    fn successor_links_to_previous() {
        let g = Block::genesis().unwrap();
        let b = Block::create(&g, BookCheckout::new("b1", "alice", "2024-01-01")).unwrap();
        assert_eq!(b.position, 1);
        assert_eq!(b.prev_hash, g.hash);
        assert!(!b.is_genesis());
        assert!(b.verify());
    }

    #[test]
    fn deterministic_with_same_inputs() {
        let g = Block::genesis().unwrap();
        let ts = Utc::now();
        let data = BookCheckout::new("b1", "alice", "2024-01-01");
        let b1 = Block::create_at(&g, data.clone(), ts).unwrap();
        let b2 = Block::create_at(&g, data, ts).unwrap();
        assert_eq!(b1.hash, b2.hash);
    }

    #[test]
    fn json_field_names() {
        let g = Block::genesis().unwrap();
        let v = serde_json::to_value(&g).unwrap();
        for field in ["position", "data", "timestamp", "hash", "prev_hash"] {
            assert!(v.get(field).is_some(), "missing {field}");
        }
        assert_eq!(v["data"]["is_genesis"], true);
    }

    #[test]
    fn survives_json_roundtrip_and_still_verifies() {
        let g = Block::genesis().unwrap();
        let b = Block::create(&g, BookCheckout::new("b1", "alice", "2024-01-01")).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert!(back.verify());
    }

    #[test]
    fn checkout_decodes_with_missing_fields() {
        let c: BookCheckout = serde_json::from_str(r#"{"book_id":"b9"}"#).unwrap();
        assert_eq!(c.book_id, "b9");
        assert!(c.user.is_empty());
        assert!(!c.is_genesis);
    }
}
