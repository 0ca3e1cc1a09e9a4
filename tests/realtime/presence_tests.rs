//! Presence broadcast tests across sessions.

use std::collections::BTreeSet;

use chat_backend::presentation::websocket::ServerEvent;
use pretty_assertions::assert_eq;

use crate::common::{TestApp, TestClient};

/// Who a client believes is online, from everything it has received
fn believed_online(client: &mut TestClient, view: &mut BTreeSet<String>) {
    for event in client.events() {
        match event {
            ServerEvent::OnlineUsers { user_ids } => view.extend(user_ids),
            ServerEvent::UserOnline { user_id } => {
                view.insert(user_id);
            }
            ServerEvent::UserOffline { user_id } => {
                view.remove(&user_id);
            }
            _ => {}
        }
    }
}

fn peers_of(user_id: i64, live: &[i64]) -> BTreeSet<String> {
    live.iter()
        .filter(|&&id| id != user_id)
        .map(|id| id.to_string())
        .collect()
}

#[tokio::test]
async fn test_first_snapshot_excludes_self() {
    let app = TestApp::new();

    let mut a = app.connect(1);

    assert_eq!(a.events(), vec![ServerEvent::online_users(&[])]);
}

#[tokio::test]
async fn test_peers_see_user_online_and_snapshot() {
    let app = TestApp::new();
    let mut a = app.connect(1);
    a.events();

    let mut b = app.connect(2);

    assert_eq!(b.events(), vec![ServerEvent::online_users(&[1])]);
    assert_eq!(a.events(), vec![ServerEvent::user_online(2)]);
}

#[tokio::test]
async fn test_disconnect_broadcasts_user_offline_once() {
    let app = TestApp::new();
    let a = app.connect(1);
    let mut b = app.connect(2);
    let mut c = app.connect(3);
    b.events();
    c.events();

    drop(a);

    assert_eq!(b.events(), vec![ServerEvent::user_offline(1)]);
    assert_eq!(c.events(), vec![ServerEvent::user_offline(1)]);

    let mut d = app.connect(4);
    assert_eq!(d.events(), vec![ServerEvent::online_users(&[2, 3])]);
}

#[tokio::test]
async fn test_reconnect_emits_no_second_user_online() {
    let app = TestApp::new();
    let mut observer = app.connect(9);
    let first = app.connect(1);
    observer.events();

    let second = app.connect(1);

    assert!(observer.events().is_empty());
    assert_eq!(app.state.realtime.gateway.presence().len(), 2);
    assert_eq!(
        app.state.realtime.gateway.presence().lookup(1),
        Some(second.session.id())
    );

    // The replaced connection closing leaves the user online
    drop(first);
    assert!(observer.events().is_empty());
    assert!(app.state.realtime.gateway.presence().is_online(1));

    drop(second);
    assert_eq!(observer.events(), vec![ServerEvent::user_offline(1)]);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let app = TestApp::new();
    let mut observer = app.connect(9);
    let mut a = app.connect(1);
    observer.events();

    a.session.close();
    a.session.close();
    drop(a);

    assert_eq!(observer.events(), vec![ServerEvent::user_offline(1)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_connects_and_disconnects_keep_views_consistent() {
    for _ in 0..100 {
        let app = TestApp::new();

        let mut clients: Vec<(i64, TestClient, BTreeSet<String>)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (1..=8)
                .map(|user_id| {
                    let app = &app;
                    scope.spawn(move || (user_id, app.connect(user_id), BTreeSet::new()))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let live: Vec<i64> = (1..=8).collect();
        for (user_id, client, view) in clients.iter_mut() {
            believed_online(client, view);
            assert_eq!(*view, peers_of(*user_id, &live));
        }

        // Half leave while new users arrive
        let leaving = clients.split_off(4);
        let arrived: Vec<(i64, TestClient, BTreeSet<String>)> = std::thread::scope(|scope| {
            for (_, client, _) in leaving {
                scope.spawn(move || drop(client));
            }
            let handles: Vec<_> = (9..=12)
                .map(|user_id| {
                    let app = &app;
                    scope.spawn(move || (user_id, app.connect(user_id), BTreeSet::new()))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        clients.extend(arrived);

        let live: Vec<i64> = vec![1, 2, 3, 4, 9, 10, 11, 12];
        for (user_id, client, view) in clients.iter_mut() {
            believed_online(client, view);
            assert_eq!(*view, peers_of(*user_id, &live));
        }
    }
}
