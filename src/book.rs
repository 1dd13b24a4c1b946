//! Catalogue records with identifiers derived from their ISBN.
//!
//! Unrelated to the chain.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl Book {
    /// Fill `id` from the ISBN, replacing whatever the client sent.
    pub fn with_derived_id(mut self) -> Self {
        self.id = book_id(&self.isbn);
        self
    }
}

/// Hex MD5 of the ISBN. Content-derived, not a security boundary.
pub fn book_id(isbn: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(isbn.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_md5_of_isbn() {
        assert_eq!(book_id(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(book_id("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn same_isbn_same_id() {
        let a = Book {
            title: "Dune".into(),
            isbn: "9780441013593".into(),
            ..Book::default()
        }
        .with_derived_id();
        let b = Book {
            title: "Dune (reprint)".into(),
            isbn: "9780441013593".into(),
            ..Book::default()
        }
        .with_derived_id();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
    }

    #[test]
    fn client_id_is_overwritten() {
        let book = Book {
            id: "client-chosen".into(),
            isbn: "abc".into(),
            ..Book::default()
        }
        .with_derived_id();
        assert_eq!(book.id, "900150983cd24fb0d6963f7d28e17f72");
    }
}
