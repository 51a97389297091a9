// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Session bootstrap and peer-creation ordering.

use std::sync::Arc;

use assert_matches::assert_matches;
use veneer::core::{Error, Rect};
use veneer::remote::api::{RemoteCallError, RemoteInstance, SERVICE_DESKTOP, SERVICE_TOOLKIT};
use veneer::remote::config::ButtonModelConfig;
use veneer::remote::{RemoteButton, RemoteControl, RemoteSession, RemoteWindow};
use veneer_testing::LoopbackBackend;

#[test]
fn bootstrap_runs_once() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::new(Arc::new(backend.clone()));
    assert!(!session.is_connected());

    session.toolkit().unwrap();
    session.desktop().unwrap();
    session.toolkit().unwrap();

    assert!(session.is_connected());
    assert_eq!(backend.factory_calls(SERVICE_TOOLKIT), 1);
    assert_eq!(backend.factory_calls(SERVICE_DESKTOP), 1);
}

#[test]
fn bootstrap_failure_is_cached() {
    let backend = LoopbackBackend::new();
    backend.fail_service(SERVICE_TOOLKIT);
    let session = RemoteSession::new(Arc::new(backend.clone()));

    assert_matches!(session.toolkit(), Err(Error::Bootstrap(_)));
    assert_matches!(session.toolkit(), Err(Error::Bootstrap(_)));
    assert_matches!(session.desktop(), Err(Error::Bootstrap(_)));

    // The handshake ran exactly once; the failure is replayed, not retried.
    assert_eq!(backend.factory_calls(SERVICE_TOOLKIT), 1);
    assert!(!session.is_connected());
}

#[test]
fn connect_reports_failure_eagerly() {
    let backend = LoopbackBackend::new();
    backend.fail_service(SERVICE_DESKTOP);
    assert_matches!(
        RemoteSession::connect(Arc::new(backend)),
        Err(Error::Bootstrap(_))
    );
}

#[test]
fn terminate_is_idempotent() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend.clone())).unwrap();
    session.terminate().unwrap();
    session.terminate().unwrap();
    assert_eq!(backend.terminate_calls(), 1);
}

#[test]
fn control_peers_require_a_realized_parent() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend)).unwrap();

    let window = RemoteWindow::new_top_level(&session, Rect::new(0, 0, 300, 300)).unwrap();
    let parent_peer = window.peer_object().unwrap();

    // Dispose the parent peer behind the wrapper's back, then try to create
    // a child control against it.
    parent_peer.window().unwrap().dispose().unwrap();

    let result = RemoteButton::new(&session, &parent_peer, ButtonModelConfig::new("b"));
    assert_matches!(
        result,
        Err(Error::Remote(
            RemoteCallError::ObjectDisposed | RemoteCallError::MissingPeer(_)
        ))
    );
}

#[test]
fn control_peers_are_realized_against_the_parent_peer() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend.clone())).unwrap();

    let window = RemoteWindow::new_top_level(&session, Rect::new(0, 0, 600, 600)).unwrap();
    let parent_peer = window.peer_object().unwrap();
    let button = RemoteButton::new(&session, &parent_peer, ButtonModelConfig::new("b")).unwrap();

    let button_peer = button.peer_object().unwrap().peer_id();
    assert_eq!(
        backend.peer_parent(button_peer),
        Some(parent_peer.peer_id())
    );
}

#[test]
fn peer_creation_ignores_model_position_until_reapplied() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend)).unwrap();

    let window = RemoteWindow::new_top_level(&session, Rect::new(0, 0, 600, 600)).unwrap();
    let parent_peer = window.peer_object().unwrap();

    let mut config = ButtonModelConfig::new("b");
    config.bounds = Rect::new(50, 60, 100, 40);
    let button = RemoteButton::new(&session, &parent_peer, config).unwrap();

    // The wrapper re-applies geometry after peer creation, so the position
    // survives even though the peer class ignores the model position.
    assert_eq!(button.bounds().unwrap(), Rect::new(50, 60, 100, 40));
    assert!(button.is_visible().unwrap());
}

#[test]
fn wrapper_dispose_is_idempotent() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend)).unwrap();

    let mut window = RemoteWindow::new_top_level(&session, Rect::new(0, 0, 300, 300)).unwrap();
    window.dispose().unwrap();
    assert!(window.is_disposed());
    window.dispose().unwrap();

    // A disposed wrapper never dereferences its peer again.
    assert_matches!(window.bounds(), Err(Error::WidgetDisposed));
    assert_matches!(window.set_visible(true), Err(Error::WidgetDisposed));
}

#[test]
fn image_models_carry_their_configuration() {
    use veneer::remote::config::ImageModelConfig;
    use veneer::remote::RemoteImage;

    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend)).unwrap();

    let mut config = ImageModelConfig::new("picture");
    config.help_text = "Help Text".to_owned();
    let image = RemoteImage::new(&session, config)
        .unwrap()
        .init_with_size(128, 64)
        .unwrap();

    let bag = image.model_object().property_set().unwrap();
    assert_eq!(
        bag.property_value("Width").unwrap().as_i32(),
        Some(128)
    );
    assert_eq!(
        bag.property_value("Height").unwrap().as_i32(),
        Some(64)
    );
    assert_eq!(
        bag.property_value("HelpText").unwrap().as_str(),
        Some("Help Text")
    );
}

#[test]
fn unknown_model_properties_are_rejected() {
    let backend = LoopbackBackend::new();
    let session = RemoteSession::connect(Arc::new(backend)).unwrap();
    let factory = session.factory();

    let model = factory
        .create_instance(veneer::remote::api::SERVICE_BUTTON_MODEL)
        .unwrap();
    let bag = model.property_set().unwrap();
    assert_matches!(
        bag.set_property_value("NoSuchProperty", 1_i32.into()),
        Err(RemoteCallError::UnknownProperty(_))
    );
    assert_matches!(
        bag.set_property_value("Label", 1_i32.into()),
        Err(RemoteCallError::PropertyTypeMismatch { .. })
    );
}
