//! Room membership through client events.

use chat_backend::config::Settings;
use chat_backend::domain::Room;
use chat_backend::presentation::websocket::ServerEvent;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{test_settings, TestApp};

fn unchecked_settings() -> Settings {
    let mut settings = test_settings();
    settings.websocket.authorize_chat_joins = false;
    settings
}

#[tokio::test]
async fn test_connect_joins_personal_room() {
    let app = TestApp::new();

    let a = app.connect(1);

    let rooms = app.state.realtime.gateway.rooms();
    assert!(rooms.is_member(a.session.id(), Room::user(1)));
}

#[tokio::test]
async fn test_participant_can_join_and_leave() {
    let app = TestApp::new();
    app.add_chat(123, &[1, 2]);
    let mut a = app.connect(1);
    a.events();
    let rooms = app.state.realtime.gateway.rooms();

    a.send(json!({"event": "join-chat", "data": "123"})).await;
    a.send(json!({"event": "join-chat", "data": 123})).await;
    assert!(rooms.is_member(a.session.id(), Room::chat(123)));
    assert_eq!(rooms.members(Room::chat(123)).len(), 1);

    a.send(json!({"event": "leave-chat", "data": "123"})).await;
    a.send(json!({"event": "leave-chat", "data": "123"})).await;
    assert!(!rooms.is_member(a.session.id(), Room::chat(123)));
    assert!(a.events().is_empty());
}

#[tokio::test]
async fn test_non_participant_join_is_refused() {
    let app = TestApp::new();
    app.add_chat(123, &[1, 2]);
    let mut outsider = app.connect(3);
    outsider.events();

    outsider.send(json!({"event": "join-chat", "data": "123"})).await;

    assert_eq!(outsider.events(), vec![ServerEvent::error("Chat not found")]);
    assert!(!app
        .state
        .realtime
        .gateway
        .rooms()
        .is_member(outsider.session.id(), Room::chat(123)));
}

#[tokio::test]
async fn test_unchecked_joins_allow_any_chat() {
    let app = TestApp::with_settings(unchecked_settings());
    let mut outsider = app.connect(3);
    outsider.events();

    outsider.send(json!({"event": "join-chat", "data": "777"})).await;

    assert!(outsider.events().is_empty());
    assert!(app
        .state
        .realtime
        .gateway
        .rooms()
        .is_member(outsider.session.id(), Room::chat(777)));
}

#[tokio::test]
async fn test_disconnect_releases_all_rooms() {
    let app = TestApp::new();
    app.add_chat(1, &[5]);
    app.add_chat(2, &[5]);
    let a = app.connect(5);
    a.send(json!({"event": "join-chat", "data": "1"})).await;
    a.send(json!({"event": "join-chat", "data": "2"})).await;
    let id = a.session.id();

    drop(a);

    let rooms = app.state.realtime.gateway.rooms();
    assert!(rooms.rooms_of(id).is_empty());
    assert_eq!(rooms.room_count(), 0);
}

#[tokio::test]
async fn test_unknown_event_yields_socket_error() {
    let app = TestApp::new();
    let mut a = app.connect(1);
    a.events();

    a.send(json!({"event": "delete-chat", "data": "1"})).await;
    a.session.handle_text("{not json").await;

    assert_eq!(
        a.events(),
        vec![
            ServerEvent::error("Unknown event"),
            ServerEvent::error("Unknown event")
        ]
    );
}

#[tokio::test]
async fn test_typing_indicator_gets_no_reply() {
    let app = TestApp::new();
    let mut a = app.connect(1);
    let mut b = app.connect(2);
    a.events();
    b.events();

    a.send(json!({"event": "typing", "data": {"chatId": "1"}})).await;

    assert!(a.events().is_empty());
    assert!(b.events().is_empty());
}
