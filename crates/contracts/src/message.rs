//! Message - the unit flowing through a topology
//!
//! A message carries an opaque payload plus the lineage needed to acknowledge
//! it upstream: for every source that contributed to it, one commit token.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::Source;

/// Opaque acknowledgement position within one source.
///
/// Only the source that issued a token knows its concrete type; it recovers
/// it with [`CommitToken::downcast_ref`]. Cloning is O(1).
///
/// # Examples
/// ```
/// use contracts::CommitToken;
///
/// let token = CommitToken::new(42u64);
/// assert_eq!(token.downcast_ref::<u64>(), Some(&42));
/// assert!(token.downcast_ref::<i32>().is_none());
/// ```
#[derive(Clone)]
pub struct CommitToken(Arc<dyn Any + Send + Sync>);

impl CommitToken {
    /// Wrap a source-specific position.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the position as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// Whether the token holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.0).is::<T>()
    }
}

impl fmt::Debug for CommitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CommitToken(..)")
    }
}

/// Source -> commit token mapping.
///
/// Sources are keyed by identity (the `Arc` allocation), so two handles to the
/// same source always collapse into one entry. Entries keep the order in
/// which their source was first recorded, which is also the order pipes
/// commit them in.
#[derive(Clone, Default)]
pub struct Metadata {
    entries: Vec<(Arc<dyn Source>, CommitToken)>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` for `source`.
    ///
    /// An already-recorded source keeps its position and gets the new token.
    pub fn insert(&mut self, source: Arc<dyn Source>, token: CommitToken) {
        match self.position(source.as_ref()) {
            Some(idx) => self.entries[idx].1 = token,
            None => self.entries.push((source, token)),
        }
    }

    /// Fold the lineage of another message into this one.
    ///
    /// Tokens from `other` win for sources present in both.
    pub fn merge(&mut self, other: &Metadata) {
        for (source, token) in &other.entries {
            self.insert(Arc::clone(source), token.clone());
        }
    }

    /// Token recorded for `source`
    pub fn get(&self, source: &dyn Source) -> Option<&CommitToken> {
        self.position(source).map(|idx| &self.entries[idx].1)
    }

    /// Whether `source` is part of the lineage
    pub fn contains(&self, source: &dyn Source) -> bool {
        self.position(source).is_some()
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no source is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate (source, token) pairs in recording order
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<dyn Source>, &CommitToken)> {
        self.entries.iter().map(|(source, token)| (source, token))
    }

    /// Source names in recording order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(source, _)| source.name())
    }

    fn position(&self, source: &dyn Source) -> Option<usize> {
        self.entries
            .iter()
            .position(|(known, _)| std::ptr::addr_eq(Arc::as_ptr(known), source))
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources()).finish()
    }
}

/// Message flowing between processing stages
///
/// Payload and key are reference-counted `Bytes`, so cloning a message never
/// copies record data.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Optional record key
    key: Option<Bytes>,

    /// Record payload
    value: Bytes,

    /// Upstream lineage (source -> token)
    metadata: Metadata,
}

impl Message {
    /// Create a message with no key and no lineage
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            key: None,
            value: value.into(),
            metadata: Metadata::new(),
        }
    }

    /// Set the record key
    pub fn with_key(mut self, key: impl Into<Bytes>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Record `token` for `source` in the lineage
    pub fn with_origin(mut self, source: Arc<dyn Source>, token: CommitToken) -> Self {
        self.metadata.insert(source, token);
        self
    }

    /// Replace the whole lineage
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Record key
    pub fn key(&self) -> Option<&Bytes> {
        self.key.as_ref()
    }

    /// Record payload
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Upstream lineage
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether the message carries neither key nor payload
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContractError;

    struct NamedSource(&'static str);

    impl Source for NamedSource {
        fn name(&self) -> &str {
            self.0
        }

        fn commit(&self, _token: &CommitToken) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[test]
    fn test_insert_replaces_token_in_place() {
        let orders: Arc<dyn Source> = Arc::new(NamedSource("orders"));
        let users: Arc<dyn Source> = Arc::new(NamedSource("users"));

        let mut meta = Metadata::new();
        meta.insert(Arc::clone(&orders), CommitToken::new(1u64));
        meta.insert(Arc::clone(&users), CommitToken::new(7u64));
        meta.insert(Arc::clone(&orders), CommitToken::new(2u64));

        assert_eq!(meta.len(), 2);
        assert_eq!(meta.sources().collect::<Vec<_>>(), vec!["orders", "users"]);
        let token = meta.get(orders.as_ref()).unwrap();
        assert_eq!(token.downcast_ref::<u64>(), Some(&2));
    }

    #[test]
    fn test_sources_keyed_by_identity_not_name() {
        let a: Arc<dyn Source> = Arc::new(NamedSource("dup"));
        let b: Arc<dyn Source> = Arc::new(NamedSource("dup"));

        let msg = Message::new("v")
            .with_origin(Arc::clone(&a), CommitToken::new(1u64))
            .with_origin(Arc::clone(&b), CommitToken::new(2u64));

        assert_eq!(msg.metadata().len(), 2);
        assert!(msg.metadata().contains(a.as_ref()));
        assert!(msg.metadata().contains(b.as_ref()));
    }

    #[test]
    fn test_merge_newer_token_wins() {
        let orders: Arc<dyn Source> = Arc::new(NamedSource("orders"));
        let users: Arc<dyn Source> = Arc::new(NamedSource("users"));

        let mut older = Metadata::new();
        older.insert(Arc::clone(&orders), CommitToken::new(10u64));

        let mut newer = Metadata::new();
        newer.insert(Arc::clone(&users), CommitToken::new(3u64));
        newer.insert(Arc::clone(&orders), CommitToken::new(11u64));

        older.merge(&newer);

        assert_eq!(older.sources().collect::<Vec<_>>(), vec!["orders", "users"]);
        let orders_token = older.get(orders.as_ref()).unwrap();
        assert_eq!(orders_token.downcast_ref::<u64>(), Some(&11));
        let users_token = older.get(users.as_ref()).unwrap();
        assert_eq!(users_token.downcast_ref::<u64>(), Some(&3));
    }

    #[test]
    fn test_message_accessors() {
        let msg = Message::new("payload").with_key("k1");
        assert_eq!(msg.key().map(|k| &k[..]), Some(&b"k1"[..]));
        assert_eq!(&msg.value()[..], b"payload");
        assert!(msg.metadata().is_empty());
        assert!(!msg.is_empty());
        assert!(Message::default().is_empty());
    }

    #[test]
    fn test_token_type_mismatch() {
        let token = CommitToken::new(("partition-3", 99u64));
        assert!(token.is::<(&'static str, u64)>());
        assert!(token.downcast_ref::<u64>().is_none());
        assert_eq!(format!("{:?}", token), "CommitToken(..)");
    }
}
