//! In-memory account store for testing.
//!
//! `MemAccounts` implements `AccountStore` over `BTreeMap`s for
//! deterministic iteration order. Accounts are created on demand by
//! writes; reads of unknown accounts yield zero balance, empty code, and
//! empty storage.

use std::collections::BTreeMap;

use crate::traits::AccountStore;
use crate::types::{Address, Bytes32, ZERO_BYTES32};

/// One account record: balance, code, and sparse storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRecord {
    pub balance: Bytes32,
    pub code: Vec<u8>,
    pub storage: BTreeMap<Bytes32, Bytes32>,
}

/// In-memory `AccountStore` backed by `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemAccounts {
    accounts: BTreeMap<Address, AccountRecord>,
}

impl MemAccounts {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }

    /// Insert a whole account record, replacing any existing one.
    pub fn insert(&mut self, addr: Address, record: AccountRecord) {
        self.accounts.insert(addr, record);
    }

    /// Look up an account record.
    pub fn account(&self, addr: &Address) -> Option<&AccountRecord> {
        self.accounts.get(addr)
    }

    /// Number of accounts in the store.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the store holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn entry(&mut self, addr: &Address) -> &mut AccountRecord {
        self.accounts.entry(*addr).or_default()
    }
}

impl AccountStore for MemAccounts {
    fn balance(&self, addr: &Address) -> Bytes32 {
        self.accounts
            .get(addr)
            .map(|a| a.balance)
            .unwrap_or(ZERO_BYTES32)
    }

    fn set_balance(&mut self, addr: &Address, balance: Bytes32) {
        self.entry(addr).balance = balance;
    }

    fn code(&self, addr: &Address) -> Vec<u8> {
        self.accounts
            .get(addr)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    fn set_code(&mut self, addr: &Address, code: Vec<u8>) {
        self.entry(addr).code = code;
    }

    fn storage_get(&self, addr: &Address, key: &Bytes32) -> Option<Bytes32> {
        self.accounts.get(addr)?.storage.get(key).copied()
    }

    fn storage_set(&mut self, addr: &Address, key: Bytes32, value: Bytes32) {
        self.entry(addr).storage.insert(key, value);
    }

    fn storage_delete(&mut self, addr: &Address, key: &Bytes32) {
        if let Some(account) = self.accounts.get_mut(addr) {
            account.storage.remove(key);
        }
    }
}
