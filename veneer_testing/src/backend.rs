// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! An in-memory automation service.
//!
//! Implements the whole remote boundary of `veneer::remote::api` with plain
//! data structures: property bags with known-name checking, model/control
//! linking, parent-relative peer realization, listener fan-out, and a
//! recorder for graphics calls. It reproduces the real service's observable
//! quirks — most importantly, peers ignore the model position at creation,
//! which is why the construction recipe re-applies geometry afterwards.
//!
//! Read-only calls (interface lookup, getters) never invoke listeners;
//! mutations fire their listeners after the backend's own locks are
//! released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use veneer::core::Rect;
use veneer::remote::api::{
    ActionListener, ButtonApi, ControlPeer, DesktopApi, DeviceApi, FixedTextApi, GraphicsApi,
    MouseEventData, MouseListener, PaintListener, PeerId, PosSizeFlags, ProgressApi, PropertySet,
    RemoteCallError, RemoteInstance, RemoteObject, RemotePeerApi, RemoteWindowApi, ServiceFactory,
    TextApi, ToolkitApi, TopWindowApi, TopWindowListener, WindowClass, WindowDescriptor,
    WindowListener, InvalidateFlags, SERVICE_BUTTON, SERVICE_BUTTON_MODEL, SERVICE_DESKTOP,
    SERVICE_EDIT, SERVICE_EDIT_MODEL, SERVICE_FIXED_TEXT, SERVICE_FIXED_TEXT_MODEL,
    SERVICE_IMAGE_CONTROL_MODEL, SERVICE_PROGRESS_BAR, SERVICE_PROGRESS_BAR_MODEL,
    SERVICE_TOOLKIT,
};
use veneer::remote::value::PropertyValue;

// --- MARK: PROPERTY SCHEMAS

/// Expected type per known property name.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PropType {
    Int32,
    Int16,
    Bool,
    Str,
    Font,
}

impl PropType {
    fn name(self) -> &'static str {
        match self {
            Self::Int32 => "Int32",
            Self::Int16 => "Int16",
            Self::Bool => "Bool",
            Self::Str => "Str",
            Self::Font => "Font",
        }
    }

    fn matches(self, value: &PropertyValue) -> bool {
        matches!(
            (self, value),
            (Self::Int32, PropertyValue::Int32(_))
                | (Self::Int16, PropertyValue::Int16(_))
                | (Self::Bool, PropertyValue::Bool(_))
                | (Self::Str, PropertyValue::Str(_))
                | (Self::Font, PropertyValue::Font(_))
        )
    }

    fn default_value(self) -> PropertyValue {
        match self {
            Self::Int32 => PropertyValue::Int32(0),
            Self::Int16 => PropertyValue::Int16(0),
            Self::Bool => PropertyValue::Bool(false),
            Self::Str => PropertyValue::Str(String::new()),
            Self::Font => PropertyValue::Font(Default::default()),
        }
    }
}

const GEOMETRY_PROPS: [(&str, PropType); 4] = [
    ("PositionX", PropType::Int32),
    ("PositionY", PropType::Int32),
    ("Width", PropType::Int32),
    ("Height", PropType::Int32),
];

fn model_schema(service: &str) -> Vec<(&'static str, PropType)> {
    let mut schema = GEOMETRY_PROPS.to_vec();
    schema.push(("Name", PropType::Str));
    schema.push(("Enabled", PropType::Bool));
    match service {
        SERVICE_BUTTON_MODEL => {
            schema.push(("Label", PropType::Str));
            schema.push(("PushButtonType", PropType::Int16));
        }
        SERVICE_FIXED_TEXT_MODEL => {
            schema.push(("Label", PropType::Str));
        }
        SERVICE_EDIT_MODEL => {
            schema.push(("Text", PropType::Str));
            schema.push(("FontDescriptor", PropType::Font));
        }
        SERVICE_PROGRESS_BAR_MODEL => {
            schema.push(("ProgressValue", PropType::Int32));
            schema.push(("ProgressValueMin", PropType::Int32));
            schema.push(("ProgressValueMax", PropType::Int32));
        }
        SERVICE_IMAGE_CONTROL_MODEL => {
            schema.push(("Border", PropType::Int16));
            schema.push(("ScaleImage", PropType::Bool));
            schema.push(("HelpText", PropType::Str));
        }
        _ => {}
    }
    schema
}

// --- MARK: BACKEND

/// Everything recorded by one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOp {
    LineColor(u32),
    FillColor(u32),
    Rect(i32, i32, i32, i32),
    Ellipse(i32, i32, i32, i32),
}

pub(crate) struct BackendState {
    next_id: AtomicU64,
    /// Every `create_instance` call, in order.
    pub(crate) factory_calls: Mutex<Vec<String>>,
    /// Services configured to fail instantiation.
    fail_services: Mutex<Vec<String>>,
    pub(crate) terminate_calls: AtomicU64,
    /// All realized peers, strongly held like a real service would.
    pub(crate) peers: Mutex<HashMap<PeerId, Arc<PeerObject>>>,
}

impl BackendState {
    fn next_peer_id(&self) -> PeerId {
        PeerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// The in-memory automation service. Clones share one service.
#[derive(Clone)]
pub struct LoopbackBackend {
    pub(crate) state: Arc<BackendState>,
}

impl Default for LoopbackBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(BackendState {
                next_id: AtomicU64::new(1),
                factory_calls: Mutex::new(Vec::new()),
                fail_services: Mutex::new(Vec::new()),
                terminate_calls: AtomicU64::new(0),
                peers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Makes `create_instance` fail for `service` from now on.
    pub fn fail_service(&self, service: &str) {
        self.state.fail_services.lock().unwrap().push(service.to_owned());
    }

    /// How often `service` has been instantiated.
    pub fn factory_calls(&self, service: &str) -> usize {
        self.state
            .factory_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|called| called.as_str() == service)
            .count()
    }

    pub fn terminate_calls(&self) -> u64 {
        self.state.terminate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peer(&self, id: PeerId) -> Option<Arc<PeerObject>> {
        self.state.peers.lock().unwrap().get(&id).cloned()
    }

    // --- MARK: REMOTE-SIDE INSPECTION

    /// The peer's geometry, as the service sees it.
    pub fn peer_bounds(&self, id: PeerId) -> Option<Rect> {
        self.peer(id).map(|peer| *peer.bounds.lock().unwrap())
    }

    pub fn peer_visible(&self, id: PeerId) -> Option<bool> {
        self.peer(id).map(|peer| *peer.visible.lock().unwrap())
    }

    pub fn peer_disposed(&self, id: PeerId) -> Option<bool> {
        self.peer(id).map(|peer| peer.disposed.load(Ordering::SeqCst))
    }

    /// The peer this peer was realized against, if any.
    pub fn peer_parent(&self, id: PeerId) -> Option<PeerId> {
        self.peer(id).and_then(|peer| peer.parent)
    }

    /// A model property of the control behind `id`, if `id` is a control
    /// peer.
    pub fn peer_model_property(&self, id: PeerId, name: &str) -> Option<PropertyValue> {
        let peer = self.peer(id)?;
        let model = peer.model.lock().unwrap().clone()?;
        model.property_set()?.property_value(name).ok()
    }

    /// How many geometry calls the peer has absorbed.
    pub fn pos_size_calls(&self, id: PeerId) -> u64 {
        self.peer(id)
            .map(|peer| peer.pos_size_calls.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// The draw calls recorded by the peer's graphics context.
    pub fn draw_ops(&self, id: PeerId) -> Vec<DrawOp> {
        self.peer(id)
            .and_then(|peer| peer.graphics.lock().unwrap().clone())
            .map(|graphics| graphics.ops.lock().unwrap().clone())
            .unwrap_or_default()
    }

    // --- MARK: EVENT INJECTION

    /// Fires the peer's action listeners, like a button activation.
    pub fn press(&self, id: PeerId) {
        let Some(peer) = self.peer(id) else { return };
        let listeners = peer.action_listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.action_performed();
        }
    }

    /// Fires a full click: mouse down, mouse up, then the action.
    pub fn click(&self, id: PeerId) {
        let Some(peer) = self.peer(id) else { return };
        let event = MouseEventData {
            x: 1,
            y: 1,
            button: 1,
            click_count: 1,
        };
        let mouse = peer.mouse_listeners.lock().unwrap().clone();
        for listener in &mouse {
            listener.mouse_pressed(event);
        }
        for listener in &mouse {
            listener.mouse_released(event);
        }
        self.press(id);
    }

    /// Delivers a window-manager close request to a top-level peer.
    pub fn request_close(&self, id: PeerId) {
        let Some(peer) = self.peer(id) else { return };
        let listeners = peer.top_window_listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.window_closing();
        }
    }

    /// Delivers a paint request for `update_rect`.
    pub fn request_paint(&self, id: PeerId, update_rect: Rect) {
        let Some(peer) = self.peer(id) else { return };
        let listeners = peer.paint_listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.window_paint(update_rect);
        }
    }
}

impl ServiceFactory for LoopbackBackend {
    fn create_instance(&self, service_name: &str) -> Result<RemoteObject, RemoteCallError> {
        tracing::trace!(service = service_name, "create_instance");
        self.state
            .factory_calls
            .lock()
            .unwrap()
            .push(service_name.to_owned());
        if self
            .state
            .fail_services
            .lock()
            .unwrap()
            .iter()
            .any(|failed| failed == service_name)
        {
            return Err(RemoteCallError::Backend(format!(
                "service unavailable: {service_name}"
            )));
        }
        let state = self.state.clone();
        match service_name {
            SERVICE_TOOLKIT => Ok(Arc::new(ToolkitObject {
                id: state.next_peer_id(),
                state,
            })),
            SERVICE_DESKTOP => Ok(Arc::new(DesktopObject {
                id: state.next_peer_id(),
                state,
            })),
            SERVICE_BUTTON_MODEL
            | SERVICE_FIXED_TEXT_MODEL
            | SERVICE_EDIT_MODEL
            | SERVICE_PROGRESS_BAR_MODEL
            | SERVICE_IMAGE_CONTROL_MODEL => Ok(Arc::new(ModelObject {
                id: state.next_peer_id(),
                schema: model_schema(service_name),
                values: Mutex::new(HashMap::new()),
            })),
            SERVICE_BUTTON | SERVICE_FIXED_TEXT | SERVICE_EDIT | SERVICE_PROGRESS_BAR => {
                Ok(Arc::new(ControlObject {
                    id: state.next_peer_id(),
                    service: service_name.to_owned(),
                    state,
                    model: Mutex::new(None),
                    peer: Mutex::new(None),
                }))
            }
            _ => Err(RemoteCallError::UnknownService(service_name.to_owned())),
        }
    }
}

// --- MARK: TOOLKIT / DESKTOP

struct ToolkitObject {
    id: PeerId,
    state: Arc<BackendState>,
}

impl RemoteInstance for ToolkitObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn toolkit(&self) -> Option<&dyn ToolkitApi> {
        Some(self)
    }
}

impl ToolkitApi for ToolkitObject {
    fn create_window(
        &self,
        descriptor: &WindowDescriptor,
    ) -> Result<RemoteObject, RemoteCallError> {
        let parent = match (descriptor.class, &descriptor.parent) {
            (WindowClass::Top, None) => None,
            (WindowClass::Top, Some(_)) => {
                return Err(RemoteCallError::Backend(
                    "top-level windows take no parent".into(),
                ));
            }
            (WindowClass::Container, Some(parent)) => {
                let peer = self
                    .state
                    .peers
                    .lock()
                    .unwrap()
                    .get(&parent.peer_id())
                    .cloned()
                    .ok_or(RemoteCallError::MissingPeer("parent is not a realized peer"))?;
                if peer.disposed.load(Ordering::SeqCst) {
                    return Err(RemoteCallError::ObjectDisposed);
                }
                Some(peer.id)
            }
            (WindowClass::Container, None) => {
                return Err(RemoteCallError::MissingPeer(
                    "container windows require a parent peer",
                ));
            }
        };
        let peer: RemoteObject = PeerObject::new(
            self.state.clone(),
            descriptor.bounds,
            descriptor.class == WindowClass::Top,
            parent,
        );
        Ok(peer)
    }
}

struct DesktopObject {
    id: PeerId,
    state: Arc<BackendState>,
}

impl RemoteInstance for DesktopObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn desktop(&self) -> Option<&dyn DesktopApi> {
        Some(self)
    }
}

impl DesktopApi for DesktopObject {
    fn terminate(&self) -> Result<(), RemoteCallError> {
        self.state.terminate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// --- MARK: MODELS

struct ModelObject {
    id: PeerId,
    schema: Vec<(&'static str, PropType)>,
    values: Mutex<HashMap<&'static str, PropertyValue>>,
}

impl ModelObject {
    fn lookup(&self, name: &str) -> Result<(&'static str, PropType), RemoteCallError> {
        self.schema
            .iter()
            .find(|(known, _)| *known == name)
            .copied()
            .ok_or_else(|| RemoteCallError::UnknownProperty(name.to_owned()))
    }
}

impl RemoteInstance for ModelObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn property_set(&self) -> Option<&dyn PropertySet> {
        Some(self)
    }
}

impl PropertySet for ModelObject {
    fn set_property_value(&self, name: &str, value: PropertyValue) -> Result<(), RemoteCallError> {
        let (key, expected) = self.lookup(name)?;
        if !expected.matches(&value) {
            return Err(RemoteCallError::PropertyTypeMismatch {
                name: name.to_owned(),
                expected: expected.name(),
                got: value.type_name(),
            });
        }
        self.values.lock().unwrap().insert(key, value);
        Ok(())
    }

    fn property_value(&self, name: &str) -> Result<PropertyValue, RemoteCallError> {
        let (key, prop_type) = self.lookup(name)?;
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| prop_type.default_value()))
    }
}

// --- MARK: CONTROLS

struct ControlObject {
    id: PeerId,
    service: String,
    state: Arc<BackendState>,
    model: Mutex<Option<RemoteObject>>,
    peer: Mutex<Option<Arc<PeerObject>>>,
}

impl ControlObject {
    fn model_or_err(&self) -> Result<RemoteObject, RemoteCallError> {
        self.model
            .lock()
            .unwrap()
            .clone()
            .ok_or(RemoteCallError::MissingModel("control has no model bound"))
    }

    fn peer_or_err(&self) -> Result<Arc<PeerObject>, RemoteCallError> {
        self.peer
            .lock()
            .unwrap()
            .clone()
            .ok_or(RemoteCallError::MissingPeer("peer not created yet"))
    }

    fn model_i32(&self, name: &str) -> Result<i32, RemoteCallError> {
        let model = self.model_or_err()?;
        let bag = model
            .property_set()
            .ok_or(RemoteCallError::UnsupportedInterface("PropertySet"))?;
        Ok(bag.property_value(name)?.as_i32().unwrap_or(0))
    }

    fn set_model_value(&self, name: &str, value: PropertyValue) -> Result<(), RemoteCallError> {
        let model = self.model_or_err()?;
        let bag = model
            .property_set()
            .ok_or(RemoteCallError::UnsupportedInterface("PropertySet"))?;
        bag.set_property_value(name, value)
    }
}

impl RemoteInstance for ControlObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn control(&self) -> Option<&dyn ControlPeer> {
        Some(self)
    }

    fn button(&self) -> Option<&dyn ButtonApi> {
        (self.service == SERVICE_BUTTON).then_some(self as &dyn ButtonApi)
    }

    fn fixed_text(&self) -> Option<&dyn FixedTextApi> {
        (self.service == SERVICE_FIXED_TEXT).then_some(self as &dyn FixedTextApi)
    }

    fn text_component(&self) -> Option<&dyn TextApi> {
        (self.service == SERVICE_EDIT).then_some(self as &dyn TextApi)
    }

    fn progress_bar(&self) -> Option<&dyn ProgressApi> {
        (self.service == SERVICE_PROGRESS_BAR).then_some(self as &dyn ProgressApi)
    }
}

impl ControlPeer for ControlObject {
    fn set_model(&self, model: &RemoteObject) -> Result<(), RemoteCallError> {
        if model.property_set().is_none() {
            return Err(RemoteCallError::MissingModel("object is not a model"));
        }
        *self.model.lock().unwrap() = Some(model.clone());
        Ok(())
    }

    fn model(&self) -> Result<RemoteObject, RemoteCallError> {
        self.model_or_err()
    }

    fn create_peer(
        &self,
        _toolkit: &RemoteObject,
        parent: Option<&RemoteObject>,
    ) -> Result<(), RemoteCallError> {
        if self.peer.lock().unwrap().is_some() {
            return Ok(());
        }
        let model = self.model_or_err()?;
        let parent = parent.ok_or(RemoteCallError::MissingPeer(
            "control peers require a parent peer",
        ))?;
        let parent_peer = self
            .state
            .peers
            .lock()
            .unwrap()
            .get(&parent.peer_id())
            .cloned()
            .ok_or(RemoteCallError::MissingPeer("parent is not a realized peer"))?;
        if parent_peer.disposed.load(Ordering::SeqCst) {
            return Err(RemoteCallError::ObjectDisposed);
        }

        // Like the real peer classes: the model's size is honored, its
        // position is not. Callers re-apply geometry after creation.
        let bag = model
            .property_set()
            .ok_or(RemoteCallError::UnsupportedInterface("PropertySet"))?;
        let width = bag.property_value("Width")?.as_i32().unwrap_or(0);
        let height = bag.property_value("Height")?.as_i32().unwrap_or(0);
        let bounds = Rect::new(0, 0, width, height);

        let peer = PeerObject::new(self.state.clone(), bounds, false, Some(parent_peer.id));
        peer.set_control_model(&model);
        *self.peer.lock().unwrap() = Some(peer);
        Ok(())
    }

    fn peer(&self) -> Result<RemoteObject, RemoteCallError> {
        let peer: RemoteObject = self.peer_or_err()?;
        Ok(peer)
    }
}

impl ButtonApi for ControlObject {
    fn set_label(&self, label: &str) -> Result<(), RemoteCallError> {
        self.set_model_value("Label", label.into())
    }

    fn add_action_listener(
        &self,
        listener: Arc<dyn ActionListener>,
    ) -> Result<(), RemoteCallError> {
        let peer = self.peer_or_err()?;
        peer.action_listeners.lock().unwrap().push(listener);
        Ok(())
    }
}

impl FixedTextApi for ControlObject {
    fn set_text(&self, text: &str) -> Result<(), RemoteCallError> {
        self.set_model_value("Label", text.into())
    }

    fn text(&self) -> Result<String, RemoteCallError> {
        let model = self.model_or_err()?;
        let bag = model
            .property_set()
            .ok_or(RemoteCallError::UnsupportedInterface("PropertySet"))?;
        Ok(bag
            .property_value("Label")?
            .as_str()
            .unwrap_or_default()
            .to_owned())
    }
}

impl TextApi for ControlObject {
    fn set_text(&self, text: &str) -> Result<(), RemoteCallError> {
        self.set_model_value("Text", text.into())
    }

    fn text(&self) -> Result<String, RemoteCallError> {
        let model = self.model_or_err()?;
        let bag = model
            .property_set()
            .ok_or(RemoteCallError::UnsupportedInterface("PropertySet"))?;
        Ok(bag
            .property_value("Text")?
            .as_str()
            .unwrap_or_default()
            .to_owned())
    }
}

impl ProgressApi for ControlObject {
    fn set_range(&self, min: i32, max: i32) -> Result<(), RemoteCallError> {
        self.set_model_value("ProgressValueMin", min.into())?;
        self.set_model_value("ProgressValueMax", max.into())
    }

    fn set_value(&self, value: i32) -> Result<(), RemoteCallError> {
        self.set_model_value("ProgressValue", value.into())
    }

    fn value(&self) -> Result<i32, RemoteCallError> {
        self.model_i32("ProgressValue")
    }
}

// --- MARK: PEERS

pub(crate) struct PeerObject {
    pub(crate) id: PeerId,
    state: Arc<BackendState>,
    top_level: bool,
    pub(crate) parent: Option<PeerId>,
    pub(crate) bounds: Mutex<Rect>,
    pub(crate) visible: Mutex<bool>,
    pub(crate) disposed: AtomicBool,
    pub(crate) pos_size_calls: AtomicU64,
    /// The model of the control realized through this peer, if any.
    pub(crate) model: Mutex<Option<RemoteObject>>,
    window_listeners: Mutex<Vec<Arc<dyn WindowListener>>>,
    top_window_listeners: Mutex<Vec<Arc<dyn TopWindowListener>>>,
    pub(crate) mouse_listeners: Mutex<Vec<Arc<dyn MouseListener>>>,
    paint_listeners: Mutex<Vec<Arc<dyn PaintListener>>>,
    pub(crate) action_listeners: Mutex<Vec<Arc<dyn ActionListener>>>,
    pub(crate) graphics: Mutex<Option<Arc<GraphicsObject>>>,
}

impl PeerObject {
    fn new(
        state: Arc<BackendState>,
        bounds: Rect,
        top_level: bool,
        parent: Option<PeerId>,
    ) -> Arc<Self> {
        let id = state.next_peer_id();
        let peer = Arc::new(Self {
            id,
            state: state.clone(),
            top_level,
            parent,
            bounds: Mutex::new(bounds),
            visible: Mutex::new(false),
            disposed: AtomicBool::new(false),
            pos_size_calls: AtomicU64::new(0),
            model: Mutex::new(None),
            window_listeners: Mutex::new(Vec::new()),
            top_window_listeners: Mutex::new(Vec::new()),
            mouse_listeners: Mutex::new(Vec::new()),
            paint_listeners: Mutex::new(Vec::new()),
            action_listeners: Mutex::new(Vec::new()),
            graphics: Mutex::new(None),
        });
        state.peers.lock().unwrap().insert(id, peer.clone());
        peer
    }

    fn set_control_model(&self, model: &RemoteObject) {
        *self.model.lock().unwrap() = Some(model.clone());
    }

    fn check_open(&self) -> Result<(), RemoteCallError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(RemoteCallError::ObjectDisposed);
        }
        Ok(())
    }
}

impl RemoteInstance for PeerObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn window(&self) -> Option<&dyn RemoteWindowApi> {
        Some(self)
    }

    fn peer(&self) -> Option<&dyn RemotePeerApi> {
        Some(self)
    }

    fn top_window(&self) -> Option<&dyn TopWindowApi> {
        self.top_level.then_some(self as &dyn TopWindowApi)
    }

    fn device(&self) -> Option<&dyn DeviceApi> {
        Some(self)
    }
}

impl RemoteWindowApi for PeerObject {
    fn set_pos_size(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        flags: PosSizeFlags,
    ) -> Result<(), RemoteCallError> {
        self.check_open()?;
        self.pos_size_calls.fetch_add(1, Ordering::SeqCst);
        let (moved, resized, bounds) = {
            let mut current = self.bounds.lock().unwrap();
            let old = *current;
            if flags.contains(PosSizeFlags::X) {
                current.x = x;
            }
            if flags.contains(PosSizeFlags::Y) {
                current.y = y;
            }
            if flags.contains(PosSizeFlags::WIDTH) {
                current.width = width;
            }
            if flags.contains(PosSizeFlags::HEIGHT) {
                current.height = height;
            }
            (
                old.location() != current.location(),
                old.size() != current.size(),
                *current,
            )
        };
        let listeners = self.window_listeners.lock().unwrap().clone();
        if resized {
            for listener in &listeners {
                listener.window_resized(bounds);
            }
        }
        if moved {
            for listener in &listeners {
                listener.window_moved(bounds);
            }
        }
        Ok(())
    }

    fn pos_size(&self) -> Result<Rect, RemoteCallError> {
        self.check_open()?;
        Ok(*self.bounds.lock().unwrap())
    }

    fn set_visible(&self, visible: bool) -> Result<(), RemoteCallError> {
        self.check_open()?;
        let changed = {
            let mut current = self.visible.lock().unwrap();
            let changed = *current != visible;
            *current = visible;
            changed
        };
        if changed {
            let listeners = self.window_listeners.lock().unwrap().clone();
            for listener in &listeners {
                if visible {
                    listener.window_shown();
                } else {
                    listener.window_hidden();
                }
            }
        }
        Ok(())
    }

    fn visible(&self) -> Result<bool, RemoteCallError> {
        self.check_open()?;
        Ok(*self.visible.lock().unwrap())
    }

    fn dispose(&self) -> Result<(), RemoteCallError> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let listeners = self.window_listeners.lock().unwrap().clone();
        for listener in &listeners {
            listener.disposing();
        }
        self.state.peers.lock().unwrap().remove(&self.id);
        Ok(())
    }

    fn add_window_listener(
        &self,
        listener: Arc<dyn WindowListener>,
    ) -> Result<(), RemoteCallError> {
        self.check_open()?;
        self.window_listeners.lock().unwrap().push(listener);
        Ok(())
    }

    fn add_mouse_listener(&self, listener: Arc<dyn MouseListener>) -> Result<(), RemoteCallError> {
        self.check_open()?;
        self.mouse_listeners.lock().unwrap().push(listener);
        Ok(())
    }

    fn add_paint_listener(&self, listener: Arc<dyn PaintListener>) -> Result<(), RemoteCallError> {
        self.check_open()?;
        self.paint_listeners.lock().unwrap().push(listener);
        Ok(())
    }
}

impl RemotePeerApi for PeerObject {
    fn invalidate(&self, _flags: InvalidateFlags) -> Result<(), RemoteCallError> {
        self.check_open()
    }

    fn set_background(&self, _color: u32) -> Result<(), RemoteCallError> {
        self.check_open()
    }
}

impl TopWindowApi for PeerObject {
    fn add_top_window_listener(
        &self,
        listener: Arc<dyn TopWindowListener>,
    ) -> Result<(), RemoteCallError> {
        self.check_open()?;
        self.top_window_listeners.lock().unwrap().push(listener);
        Ok(())
    }
}

impl DeviceApi for PeerObject {
    fn create_graphics(&self) -> Result<RemoteObject, RemoteCallError> {
        self.check_open()?;
        let mut slot = self.graphics.lock().unwrap();
        let graphics = match &*slot {
            Some(graphics) => graphics.clone(),
            None => {
                let graphics = Arc::new(GraphicsObject {
                    id: self.state.next_peer_id(),
                    ops: Mutex::new(Vec::new()),
                });
                *slot = Some(graphics.clone());
                graphics
            }
        };
        let object: RemoteObject = graphics;
        Ok(object)
    }

    fn create_bitmap(
        &self,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
    ) -> Result<RemoteObject, RemoteCallError> {
        self.check_open()?;
        let object: RemoteObject = Arc::new(BitmapObject {
            id: self.state.next_peer_id(),
        });
        Ok(object)
    }

    fn create_display_bitmap(
        &self,
        _bitmap: &RemoteObject,
    ) -> Result<RemoteObject, RemoteCallError> {
        self.check_open()?;
        let object: RemoteObject = Arc::new(BitmapObject {
            id: self.state.next_peer_id(),
        });
        Ok(object)
    }
}

// --- MARK: GRAPHICS

pub(crate) struct GraphicsObject {
    id: PeerId,
    pub(crate) ops: Mutex<Vec<DrawOp>>,
}

impl RemoteInstance for GraphicsObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn graphics(&self) -> Option<&dyn GraphicsApi> {
        Some(self)
    }
}

impl GraphicsApi for GraphicsObject {
    fn set_line_color(&self, color: u32) -> Result<(), RemoteCallError> {
        self.ops.lock().unwrap().push(DrawOp::LineColor(color));
        Ok(())
    }

    fn set_fill_color(&self, color: u32) -> Result<(), RemoteCallError> {
        self.ops.lock().unwrap().push(DrawOp::FillColor(color));
        Ok(())
    }

    fn draw_rect(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), RemoteCallError> {
        self.ops
            .lock()
            .unwrap()
            .push(DrawOp::Rect(x, y, width, height));
        Ok(())
    }

    fn draw_ellipse(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), RemoteCallError> {
        self.ops
            .lock()
            .unwrap()
            .push(DrawOp::Ellipse(x, y, width, height));
        Ok(())
    }
}

struct BitmapObject {
    id: PeerId,
}

impl RemoteInstance for BitmapObject {
    fn peer_id(&self) -> PeerId {
        self.id
    }
}

// --- MARK: DEBUG

// `RemoteInstance` requires `Debug`; these backend objects carry non-`Debug`
// internals (locks, shared state, listener closures), so print just the peer id.
macro_rules! debug_by_peer_id {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl std::fmt::Debug for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field("id", &self.id)
                        .finish_non_exhaustive()
                }
            }
        )+
    };
}

debug_by_peer_id!(
    ToolkitObject,
    DesktopObject,
    ModelObject,
    ControlObject,
    PeerObject,
    GraphicsObject,
    BitmapObject,
);
