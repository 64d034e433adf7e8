use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn counting_listener() -> (Arc<AtomicUsize>, Arc<Mutex<Option<Account>>>, AccountListener) {
    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None));
    let listener: AccountListener = {
        let calls = Arc::clone(&calls);
        let last = Arc::clone(&last);
        Arc::new(move |account: Option<&Account>| {
            calls.fetch_add(1, Ordering::SeqCst);
            *last.lock().unwrap() = account.cloned();
        })
    };
    (calls, last, listener)
}

#[test]
fn empty_store_has_no_account() {
    let store = InMemoryCreditStore::new();
    assert_eq!(store.current_account(), None);
}

#[test]
fn sign_in_keeps_existing_balance() {
    let store = InMemoryCreditStore::with_account("ada", 12);
    let ada = UserId("ada".to_string());
    store.sign_out();
    assert_eq!(store.current_account(), None);
    store.sign_in(ada.clone(), 99);
    assert_eq!(store.current_account().unwrap().credits, 12);
    assert_eq!(store.balance(&ada), Some(12));
}

#[tokio::test]
async fn set_balance_updates_and_notifies() {
    let store = InMemoryCreditStore::with_account("ada", 10);
    let (calls, last, listener) = counting_listener();
    let _sub = store.subscribe(listener);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let ada = UserId("ada".to_string());
    store.set_balance(&ada, 5).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(last.lock().unwrap().as_ref().unwrap().credits, 5);
    assert_eq!(store.current_account().unwrap().credits, 5);
}

#[tokio::test]
async fn set_balance_rejects_unknown_user() {
    let store = InMemoryCreditStore::with_account("ada", 10);
    let err = store
        .set_balance(&UserId("bob".to_string()), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PaintoverError::Validation(_)));
}

#[tokio::test]
async fn dropping_subscription_unregisters() {
    let store = InMemoryCreditStore::with_account("ada", 10);
    let (calls, _last, listener) = counting_listener();
    let sub = store.subscribe(listener);
    assert_eq!(store.listener_count(), 1);
    drop(sub);
    assert_eq!(store.listener_count(), 0);

    store
        .set_balance(&UserId("ada".to_string()), 3)
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn explicit_release_unregisters_once() {
    let store = InMemoryCreditStore::new();
    let (_calls, last, listener) = counting_listener();
    let sub = store.subscribe(listener);
    assert_eq!(*last.lock().unwrap(), None);
    sub.release();
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn subscription_outliving_store_is_harmless() {
    let store = InMemoryCreditStore::new();
    let (_calls, _last, listener) = counting_listener();
    let sub = store.subscribe(listener);
    drop(store);
    drop(sub);
}

#[test]
fn sign_out_notifies_with_none() {
    let store = InMemoryCreditStore::with_account("ada", 1);
    let (calls, last, listener) = counting_listener();
    let _sub = store.subscribe(listener);
    store.sign_out();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*last.lock().unwrap(), None);
}
