use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use bankapi_core::{Account, AccountId, Entity, ExternalId};

use super::r#trait::{AccountStore, StoreError};

#[derive(Debug, Default)]
struct Accounts {
    by_id: BTreeMap<AccountId, Account>,
    last_id: i64,
}

/// In-memory account store.
///
/// Intended for tests/dev. Mirrors the Postgres store's observable behaviour:
/// ids start at 1 and are never reused, external ids are unique.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Accounts>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.by_id.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Accounts>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Persistence("account store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Accounts>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Persistence("account store lock poisoned".into()))
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(&self, account: &Account) -> Result<AccountId, StoreError> {
        account.validate()?;

        let mut accounts = self.write()?;
        if accounts.by_id.values().any(|a| Entity::id(a) == Entity::id(account)) {
            return Err(StoreError::Persistence(format!(
                "duplicate account: external_id {} already exists",
                account.external_id
            )));
        }

        accounts.last_id += 1;
        let id = AccountId::new(accounts.last_id);
        accounts.by_id.insert(id, account.clone().with_id(id));
        Ok(id)
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.read()?
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn get_account_by_external_id(&self, external_id: ExternalId) -> Result<Account, StoreError> {
        self.read()?
            .by_id
            .values()
            .find(|a| a.external_id == external_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(external_id))
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.read()?.by_id.values().cloned().collect())
    }

    async fn delete_account_by_id(&self, id: AccountId) -> Result<(), StoreError> {
        self.write()?.by_id.remove(&id);
        Ok(())
    }

    async fn delete_account_by_external_id(&self, external_id: ExternalId) -> Result<(), StoreError> {
        self.write()?.by_id.retain(|_, a| a.external_id != external_id);
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        account.validate()?;

        let mut accounts = self.write()?;
        let existing = accounts
            .by_id
            .get_mut(&account.id)
            .ok_or_else(|| StoreError::not_found(account.id))?;

        existing.first_name = account.first_name.clone();
        existing.last_name = account.last_name.clone();
        existing.balance = account.balance;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryAccountStore::new();
        let a = Account::new("Ana", "Rad");

        let id = store.create_account(&a).await.unwrap();
        assert_eq!(id, AccountId::new(1));

        let got = store.get_account_by_id(id).await.unwrap();
        assert_eq!(got, a.clone().with_id(id));

        let by_ext = store.get_account_by_external_id(a.external_id).await.unwrap();
        assert_eq!(by_ext, got);
    }

    #[tokio::test]
    async fn listing_is_ordered_and_empty_when_no_accounts() {
        let store = InMemoryAccountStore::new();
        assert!(store.get_accounts().await.unwrap().is_empty());

        for name in ["A", "B", "C"] {
            store.create_account(&Account::new(name, "X")).await.unwrap();
        }

        let ids: Vec<i64> = store
            .get_accounts()
            .await
            .unwrap()
            .iter()
            .map(|a| a.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn duplicate_external_id_is_rejected() {
        let store = InMemoryAccountStore::new();
        let a = Account::new("Ana", "Rad");
        store.create_account(&a).await.unwrap();

        let err = store.create_account(&a).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_by_either_identifier() {
        let store = InMemoryAccountStore::new();
        let a = Account::new("Ana", "Rad");
        let b = Account::new("Bo", "Lin");
        let a_id = store.create_account(&a).await.unwrap();
        let b_id = store.create_account(&b).await.unwrap();

        store.delete_account_by_id(a_id).await.unwrap();
        assert!(matches!(
            store.get_account_by_id(a_id).await,
            Err(StoreError::NotFound(_))
        ));

        store.delete_account_by_external_id(b.external_id).await.unwrap();
        assert!(matches!(
            store.get_account_by_id(b_id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn deleting_missing_accounts_is_not_an_error() {
        let store = InMemoryAccountStore::new();
        store.delete_account_by_id(AccountId::new(99)).await.unwrap();
        store.delete_account_by_external_id(ExternalId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryAccountStore::new();
        let first = store.create_account(&Account::new("A", "A")).await.unwrap();
        store.delete_account_by_id(first).await.unwrap();
        let second = store.create_account(&Account::new("B", "B")).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn update_replaces_fields_but_not_external_id() {
        let store = InMemoryAccountStore::new();
        let a = Account::new("Ana", "Rad");
        let id = store.create_account(&a).await.unwrap();

        let mut changed = a.clone().with_id(id);
        changed.first_name = "Anna".into();
        changed.balance = 500;
        changed.external_id = ExternalId::new();
        store.update_account(&changed).await.unwrap();

        let got = store.get_account_by_id(id).await.unwrap();
        assert_eq!(got.first_name, "Anna");
        assert_eq!(got.balance, 500);
        assert_eq!(got.external_id, a.external_id);
    }

    #[tokio::test]
    async fn invalid_names_are_rejected_before_storing() {
        let store = InMemoryAccountStore::new();
        let long = "x".repeat(31);

        for (first, last) in [("", "Rad"), ("   ", "Rad"), ("Ana", "\t"), ("Ana", long.as_str())] {
            assert!(
                matches!(
                    store.create_account(&Account::new(first, last)).await,
                    Err(StoreError::InvalidArgument(_))
                ),
                "{first:?} {last:?}"
            );
        }
        assert!(store.is_empty().unwrap());

        let id = store.create_account(&Account::new("Ana", "Rad")).await.unwrap();
        let mut blank = store.get_account_by_id(id).await.unwrap();
        blank.first_name = "  ".into();
        assert!(matches!(
            store.update_account(&blank).await,
            Err(StoreError::InvalidArgument(_))
        ));
        assert_eq!(store.get_account_by_id(id).await.unwrap().first_name, "Ana");
    }

    #[test]
    fn poisoned_lock_is_reported_not_hidden() {
        let store = Arc::new(InMemoryAccountStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Persistence(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Persistence(_))));
    }

    #[tokio::test]
    async fn update_rejects_negative_balance_and_unknown_ids() {
        let store = InMemoryAccountStore::new();
        let id = store.create_account(&Account::new("Ana", "Rad")).await.unwrap();

        let mut negative = store.get_account_by_id(id).await.unwrap();
        negative.balance = -1;
        assert!(matches!(
            store.update_account(&negative).await,
            Err(StoreError::InvalidArgument(_))
        ));
        assert_eq!(store.get_account_by_id(id).await.unwrap().balance, 0);

        let ghost = Account::new("No", "One").with_id(AccountId::new(42));
        assert!(matches!(
            store.update_account(&ghost).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_unique_ids() {
        let store = Arc::new(InMemoryAccountStore::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_account(&Account::new(format!("F{i}"), "L"))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for h in handles {
            assert!(ids.insert(h.await.unwrap()));
        }

        let ext: HashSet<_> = store
            .get_accounts()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.external_id)
            .collect();
        assert_eq!(ext.len(), 32);
    }

    proptest::proptest! {
        #[test]
        fn created_accounts_have_distinct_identifiers(
            names in proptest::collection::vec("[A-Za-z]{1,30}", 1..20)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = InMemoryAccountStore::new();

            let accounts = rt.block_on(async {
                for n in &names {
                    store.create_account(&Account::new(n.clone(), n.clone())).await.unwrap();
                }
                store.get_accounts().await.unwrap()
            });

            let ids: HashSet<_> = accounts.iter().map(|a| a.id).collect();
            let exts: HashSet<_> = accounts.iter().map(|a| a.external_id).collect();
            proptest::prop_assert_eq!(ids.len(), names.len());
            proptest::prop_assert_eq!(exts.len(), names.len());
        }
    }
}
