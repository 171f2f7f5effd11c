use crate::contact::{Contact, ContactKind};
use std::collections::HashSet;
use std::hash::Hash;

/// Identity of a contact within one page or one site
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub kind: ContactKind,
    pub value: String,
}

/// Identity of a contact across sites: the same value found on two pages is
/// kept once per page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey {
    pub kind: ContactKind,
    pub value: String,
    pub source_url: String,
}

/// Insertion-ordered, first-seen-wins contact set
#[derive(Debug, Clone)]
pub struct DedupStore<K = DedupKey> {
    seen: HashSet<K>,
    contacts: Vec<Contact>,
}

impl<K: Hash + Eq> Default for DedupStore<K> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            contacts: Vec::new(),
        }
    }
}

impl<K: Hash + Eq> DedupStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the contact unless the key was seen before
    ///
    /// Returns `true` when the contact was stored.
    pub fn insert_by(&mut self, key: K, contact: Contact) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.contacts.push(contact);
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn into_contacts(self) -> Vec<Contact> {
        self.contacts
    }
}

impl DedupStore<DedupKey> {
    /// Stores the contact under its `(kind, normalized value)` key
    pub fn insert(&mut self, contact: Contact) -> bool {
        let key = contact.dedup_key();
        self.insert_by(key, contact)
    }

    pub fn extend(&mut self, contacts: impl IntoIterator<Item = Contact>) -> usize {
        let mut added = 0;
        for contact in contacts {
            if self.insert(contact) {
                added += 1;
            }
        }
        added
    }
}

impl DedupStore<SiteKey> {
    /// Stores the contact under its cross-site key
    pub fn insert(&mut self, contact: Contact) -> bool {
        let key = contact.site_key();
        self.insert_by(key, contact)
    }
}
