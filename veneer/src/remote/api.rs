// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The automation-service boundary.
//!
//! Everything the toolkit knows about the remote service is expressed here as
//! traits: a factory that instantiates services by name, and
//! queryInterface-style accessors on the resulting objects. The service-name
//! strings are a wire protocol — they must match the remote service byte for
//! byte.
//!
//! Real transports and the in-memory loopback backend (see `veneer_testing`)
//! implement these traits; the rest of the crate never sees anything else.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use thiserror::Error;

use crate::core::Rect;
use crate::remote::value::PropertyValue;

// --- MARK: SERVICE NAMES

pub const SERVICE_TOOLKIT: &str = "com.sun.star.awt.Toolkit";
pub const SERVICE_DESKTOP: &str = "com.sun.star.frame.Desktop";

pub const SERVICE_BUTTON: &str = "com.sun.star.awt.UnoControlButton";
pub const SERVICE_BUTTON_MODEL: &str = "com.sun.star.awt.UnoControlButtonModel";
pub const SERVICE_FIXED_TEXT: &str = "com.sun.star.awt.UnoControlFixedText";
pub const SERVICE_FIXED_TEXT_MODEL: &str = "com.sun.star.awt.UnoControlFixedTextModel";
pub const SERVICE_EDIT: &str = "com.sun.star.awt.UnoControlEdit";
pub const SERVICE_EDIT_MODEL: &str = "com.sun.star.awt.UnoControlEditModel";
pub const SERVICE_PROGRESS_BAR: &str = "com.sun.star.awt.UnoControlProgressBar";
pub const SERVICE_PROGRESS_BAR_MODEL: &str = "com.sun.star.awt.UnoControlProgressBarModel";
pub const SERVICE_IMAGE_CONTROL_MODEL: &str = "com.sun.star.awt.UnoControlImageControlModel";

/// The window service named in a [`WindowDescriptor`].
pub const WINDOW_SERVICE_NAME: &str = "window";

// --- MARK: ERRORS

/// Failure of a single remote call.
///
/// `Clone` so that the session bootstrap can cache and replay a failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteCallError {
    /// The service name is not known to the factory.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// The property name is not part of the model's property set.
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// A property value had the wrong type.
    #[error("property {name} expects {expected}, got {got}")]
    PropertyTypeMismatch {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    /// The object does not implement the requested interface.
    #[error("interface not supported: {0}")]
    UnsupportedInterface(&'static str),

    /// The remote object has already been disposed.
    #[error("remote object is disposed")]
    ObjectDisposed,

    /// A peer-relative operation ran before the peer was created, or peer
    /// creation was attempted without a realized parent.
    #[error("no peer: {0}")]
    MissingPeer(&'static str),

    /// The control has no model bound, or the model is unsuitable.
    #[error("no model: {0}")]
    MissingModel(&'static str),

    /// Any other backend-reported failure.
    #[error("backend error: {0}")]
    Backend(String),
}

// --- MARK: OBJECTS

/// Identity of a remote object, stable for the object's lifetime.
///
/// Peer ids key the display's widget map, which resolves remote callbacks
/// back to toolkit widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handle to a remote object.
pub type RemoteObject = Arc<dyn RemoteInstance>;

/// A remote object, exposing its interfaces queryInterface-style.
///
/// Every accessor defaults to `None`; implementations override the interfaces
/// the underlying service actually provides. The remote API distinguishes a
/// control's *model* (data), the *control* (behavior) and the *peer* (its
/// on-screen window); one object frequently implements several interfaces.
pub trait RemoteInstance: Send + Sync + fmt::Debug {
    fn peer_id(&self) -> PeerId;

    fn property_set(&self) -> Option<&dyn PropertySet> {
        None
    }
    fn control(&self) -> Option<&dyn ControlPeer> {
        None
    }
    fn window(&self) -> Option<&dyn RemoteWindowApi> {
        None
    }
    fn peer(&self) -> Option<&dyn RemotePeerApi> {
        None
    }
    fn top_window(&self) -> Option<&dyn TopWindowApi> {
        None
    }
    fn button(&self) -> Option<&dyn ButtonApi> {
        None
    }
    fn fixed_text(&self) -> Option<&dyn FixedTextApi> {
        None
    }
    fn text_component(&self) -> Option<&dyn TextApi> {
        None
    }
    fn progress_bar(&self) -> Option<&dyn ProgressApi> {
        None
    }
    fn device(&self) -> Option<&dyn DeviceApi> {
        None
    }
    fn graphics(&self) -> Option<&dyn GraphicsApi> {
        None
    }
    fn toolkit(&self) -> Option<&dyn ToolkitApi> {
        None
    }
    fn desktop(&self) -> Option<&dyn DesktopApi> {
        None
    }
}

/// Instantiates remote services by name.
pub trait ServiceFactory: Send + Sync {
    fn create_instance(&self, service_name: &str) -> Result<RemoteObject, RemoteCallError>;
}

// --- MARK: INTERFACES

/// The untyped property bag of a remote model.
///
/// This is a dynamic-typing boundary; the typed configurations in
/// [`remote::config`](crate::remote::config) are the only place the toolkit
/// writes to it.
pub trait PropertySet: Send + Sync {
    fn set_property_value(&self, name: &str, value: PropertyValue) -> Result<(), RemoteCallError>;
    fn property_value(&self, name: &str) -> Result<PropertyValue, RemoteCallError>;
}

/// A remote control: bindable to a model, realizable as a peer.
pub trait ControlPeer: Send + Sync {
    fn set_model(&self, model: &RemoteObject) -> Result<(), RemoteCallError>;
    fn model(&self) -> Result<RemoteObject, RemoteCallError>;

    /// Realizes the control's on-screen presence, parented to `parent`.
    ///
    /// The parent peer must already exist; `None` is only valid for services
    /// that create top-level windows themselves.
    fn create_peer(
        &self,
        toolkit: &RemoteObject,
        parent: Option<&RemoteObject>,
    ) -> Result<(), RemoteCallError>;

    /// The realized peer, or [`RemoteCallError::MissingPeer`] before
    /// [`create_peer`](Self::create_peer).
    fn peer(&self) -> Result<RemoteObject, RemoteCallError>;
}

bitflags! {
    /// Which fields of a `set_pos_size` call apply.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PosSizeFlags: u16 {
        const X = 1;
        const Y = 2;
        const WIDTH = 4;
        const HEIGHT = 8;
    }
}

impl PosSizeFlags {
    pub const POS: Self = Self::X.union(Self::Y);
    pub const SIZE: Self = Self::WIDTH.union(Self::HEIGHT);
    pub const POSSIZE: Self = Self::POS.union(Self::SIZE);
}

/// The window interface of a realized peer.
pub trait RemoteWindowApi: Send + Sync {
    fn set_pos_size(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        flags: PosSizeFlags,
    ) -> Result<(), RemoteCallError>;
    fn pos_size(&self) -> Result<Rect, RemoteCallError>;
    fn set_visible(&self, visible: bool) -> Result<(), RemoteCallError>;
    fn visible(&self) -> Result<bool, RemoteCallError>;
    fn dispose(&self) -> Result<(), RemoteCallError>;

    fn add_window_listener(&self, listener: Arc<dyn WindowListener>)
        -> Result<(), RemoteCallError>;
    fn add_mouse_listener(&self, listener: Arc<dyn MouseListener>) -> Result<(), RemoteCallError>;
    fn add_paint_listener(&self, listener: Arc<dyn PaintListener>) -> Result<(), RemoteCallError>;
}

bitflags! {
    /// Invalidate flags, matching the remote service's values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InvalidateFlags: u16 {
        const CHILDREN = 1;
        const NOCHILDREN = 2;
        const NOERASE = 4;
        const UPDATE = 8;
        const TRANSPARENT = 16;
    }
}

/// The peer interface of a realized peer (distinct from its window
/// interface, even though both live on the same object).
pub trait RemotePeerApi: Send + Sync {
    fn invalidate(&self, flags: InvalidateFlags) -> Result<(), RemoteCallError>;
    fn set_background(&self, color: u32) -> Result<(), RemoteCallError>;
}

/// The top-window interface of top-level peers.
pub trait TopWindowApi: Send + Sync {
    fn add_top_window_listener(
        &self,
        listener: Arc<dyn TopWindowListener>,
    ) -> Result<(), RemoteCallError>;
}

/// The button interface of a button control.
pub trait ButtonApi: Send + Sync {
    fn set_label(&self, label: &str) -> Result<(), RemoteCallError>;
    fn add_action_listener(&self, listener: Arc<dyn ActionListener>)
        -> Result<(), RemoteCallError>;
}

/// The fixed-text interface of a label control.
pub trait FixedTextApi: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), RemoteCallError>;
    fn text(&self) -> Result<String, RemoteCallError>;
}

/// The text-component interface of an edit control.
pub trait TextApi: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), RemoteCallError>;
    fn text(&self) -> Result<String, RemoteCallError>;
}

/// The progress-bar interface of a progress-bar control.
pub trait ProgressApi: Send + Sync {
    fn set_range(&self, min: i32, max: i32) -> Result<(), RemoteCallError>;
    fn set_value(&self, value: i32) -> Result<(), RemoteCallError>;
    fn value(&self) -> Result<i32, RemoteCallError>;
}

/// The graphics-device interface of a window.
pub trait DeviceApi: Send + Sync {
    fn create_graphics(&self) -> Result<RemoteObject, RemoteCallError>;
    fn create_bitmap(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<RemoteObject, RemoteCallError>;
    /// Converts a bitmap into one matching this device's format.
    fn create_display_bitmap(
        &self,
        bitmap: &RemoteObject,
    ) -> Result<RemoteObject, RemoteCallError>;
}

/// A remote graphics context.
pub trait GraphicsApi: Send + Sync {
    fn set_line_color(&self, color: u32) -> Result<(), RemoteCallError>;
    fn set_fill_color(&self, color: u32) -> Result<(), RemoteCallError>;
    fn draw_rect(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), RemoteCallError>;
    fn draw_ellipse(&self, x: i32, y: i32, width: i32, height: i32)
        -> Result<(), RemoteCallError>;
}

/// The toolkit service: the factory for plain windows.
pub trait ToolkitApi: Send + Sync {
    fn create_window(&self, descriptor: &WindowDescriptor) -> Result<RemoteObject, RemoteCallError>;
}

/// The desktop singleton.
pub trait DesktopApi: Send + Sync {
    fn terminate(&self) -> Result<(), RemoteCallError>;
}

// --- MARK: WINDOW DESCRIPTORS

/// Classes of windows the toolkit service can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// A top-level window managed by the desktop.
    Top,
    /// A child container window, parented to an existing peer.
    Container,
}

bitflags! {
    /// Window attribute bits, matching the remote service's values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowAttributes: u32 {
        const SHOW = 1;
        const FULLSIZE = 2;
        const OPTIMUMSIZE = 4;
        const MINSIZE = 8;
        const BORDER = 16;
        const SIZEABLE = 32;
        const MOVEABLE = 64;
        const CLOSEABLE = 128;
    }
}

/// Everything the toolkit service needs to create a window peer.
#[derive(Clone)]
pub struct WindowDescriptor {
    pub class: WindowClass,
    pub service_name: &'static str,
    /// Required for [`WindowClass::Container`]; must be `None` for
    /// [`WindowClass::Top`].
    pub parent: Option<RemoteObject>,
    pub bounds: Rect,
    pub attributes: WindowAttributes,
}

impl fmt::Debug for WindowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowDescriptor")
            .field("class", &self.class)
            .field("service_name", &self.service_name)
            .field("parent", &self.parent.as_ref().map(|p| p.peer_id()))
            .field("bounds", &self.bounds)
            .field("attributes", &self.attributes)
            .finish()
    }
}

// --- MARK: LISTENERS

/// Mouse event payload delivered by the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseEventData {
    pub x: i32,
    pub y: i32,
    /// 1-based button number.
    pub button: u32,
    pub click_count: u32,
}

/// Window geometry/visibility callbacks.
pub trait WindowListener: Send + Sync {
    fn window_shown(&self) {}
    fn window_hidden(&self) {}
    fn window_resized(&self, _bounds: Rect) {}
    fn window_moved(&self, _bounds: Rect) {}
    fn disposing(&self) {}
}

/// Top-level window lifecycle callbacks.
pub trait TopWindowListener: Send + Sync {
    fn window_opened(&self) {}
    fn window_closing(&self) {}
    fn window_closed(&self) {}
    fn window_activated(&self) {}
    fn window_deactivated(&self) {}
    fn window_minimized(&self) {}
    fn window_normalized(&self) {}
    fn disposing(&self) {}
}

/// Mouse callbacks.
pub trait MouseListener: Send + Sync {
    fn mouse_pressed(&self, _event: MouseEventData) {}
    fn mouse_released(&self, _event: MouseEventData) {}
    fn mouse_entered(&self, _event: MouseEventData) {}
    fn mouse_exited(&self, _event: MouseEventData) {}
    fn disposing(&self) {}
}

/// Button activation callbacks.
pub trait ActionListener: Send + Sync {
    fn action_performed(&self);
    fn disposing(&self) {}
}

/// Paint callbacks.
pub trait PaintListener: Send + Sync {
    fn window_paint(&self, update_rect: Rect);
    fn disposing(&self) {}
}

// --- MARK: INTERFACE LOOKUP

/// queryInterface helpers. Each returns [`RemoteCallError::UnsupportedInterface`]
/// when the object does not provide the interface.
pub(crate) fn property_set(object: &RemoteObject) -> Result<&dyn PropertySet, RemoteCallError> {
    object
        .property_set()
        .ok_or(RemoteCallError::UnsupportedInterface("PropertySet"))
}

pub(crate) fn control(object: &RemoteObject) -> Result<&dyn ControlPeer, RemoteCallError> {
    object
        .control()
        .ok_or(RemoteCallError::UnsupportedInterface("ControlPeer"))
}

pub(crate) fn window(object: &RemoteObject) -> Result<&dyn RemoteWindowApi, RemoteCallError> {
    object
        .window()
        .ok_or(RemoteCallError::UnsupportedInterface("RemoteWindow"))
}

pub(crate) fn peer(object: &RemoteObject) -> Result<&dyn RemotePeerApi, RemoteCallError> {
    object
        .peer()
        .ok_or(RemoteCallError::UnsupportedInterface("RemotePeer"))
}

pub(crate) fn top_window(object: &RemoteObject) -> Result<&dyn TopWindowApi, RemoteCallError> {
    object
        .top_window()
        .ok_or(RemoteCallError::UnsupportedInterface("TopWindow"))
}

pub(crate) fn button(object: &RemoteObject) -> Result<&dyn ButtonApi, RemoteCallError> {
    object
        .button()
        .ok_or(RemoteCallError::UnsupportedInterface("Button"))
}

pub(crate) fn fixed_text(object: &RemoteObject) -> Result<&dyn FixedTextApi, RemoteCallError> {
    object
        .fixed_text()
        .ok_or(RemoteCallError::UnsupportedInterface("FixedText"))
}

pub(crate) fn text_component(object: &RemoteObject) -> Result<&dyn TextApi, RemoteCallError> {
    object
        .text_component()
        .ok_or(RemoteCallError::UnsupportedInterface("TextComponent"))
}

pub(crate) fn progress_bar(object: &RemoteObject) -> Result<&dyn ProgressApi, RemoteCallError> {
    object
        .progress_bar()
        .ok_or(RemoteCallError::UnsupportedInterface("ProgressBar"))
}

pub(crate) fn device(object: &RemoteObject) -> Result<&dyn DeviceApi, RemoteCallError> {
    object
        .device()
        .ok_or(RemoteCallError::UnsupportedInterface("Device"))
}

pub(crate) fn graphics(object: &RemoteObject) -> Result<&dyn GraphicsApi, RemoteCallError> {
    object
        .graphics()
        .ok_or(RemoteCallError::UnsupportedInterface("Graphics"))
}

pub(crate) fn toolkit(object: &RemoteObject) -> Result<&dyn ToolkitApi, RemoteCallError> {
    object
        .toolkit()
        .ok_or(RemoteCallError::UnsupportedInterface("Toolkit"))
}

pub(crate) fn desktop(object: &RemoteObject) -> Result<&dyn DesktopApi, RemoteCallError> {
    object
        .desktop()
        .ok_or(RemoteCallError::UnsupportedInterface("Desktop"))
}
