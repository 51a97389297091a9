// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::app::WindowGlue;
use crate::core::{Error, Event, EventType, Rect, Result, Style};
use crate::remote::api::RemoteInstance;
use crate::remote::{RemoteControl, RemoteWindow};
use crate::widgets::widget::{sealed, RemoteHandle, WidgetData, WidgetHandle, WidgetKind};
use crate::widgets::{Container, Control, Widget, WidgetId};

/// A container presenting one child control per tab.
///
/// Items are widgets, not controls: they have no peer of their own. Each
/// item names a child control of the folder; selecting an item shows its
/// control and hides the previously selected one.
pub struct TabFolder {
    handle: WidgetHandle,
}

/// One tab of a [`TabFolder`].
pub struct TabItem {
    handle: WidgetHandle,
}

const DEFAULT_FOLDER_BOUNDS: Rect = Rect::new(0, 0, 400, 400);

impl TabFolder {
    pub fn new(parent: &impl Container, style: Style) -> Result<Self> {
        let display = parent.display().clone();
        display.core().check_widget(parent.id())?;
        let parent_peer = display
            .core()
            .with_widget(parent.id(), |data| data.remote.peer_object())?;
        let window =
            RemoteWindow::new_container(display.session(), &parent_peer, DEFAULT_FOLDER_BOUNDS)?;

        let peer = window.peer_object()?.peer_id();
        let dispatcher = display.core().dispatcher();
        window.add_window_listener(Arc::new(WindowGlue { dispatcher, peer }))?;

        let data = WidgetData::new(WidgetKind::TabFolder, RemoteHandle::Window(window), style);
        let id = display.core().register_widget(data, Some(parent.id()))?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }

    fn item_ids(&self) -> Result<Vec<WidgetId>> {
        let core = self.handle.display.core();
        let children = core.with_widget(self.handle.id, |data| Ok(data.children.clone()))?;
        let mut items = Vec::new();
        for child in children {
            let is_item = core
                .with_widget(child, |data| Ok(data.kind == WidgetKind::TabItem))
                .unwrap_or(false);
            if is_item {
                items.push(child);
            }
        }
        Ok(items)
    }

    pub fn items(&self) -> Result<Vec<TabItem>> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        Ok(self
            .item_ids()?
            .into_iter()
            .map(|id| TabItem {
                handle: WidgetHandle {
                    display: self.handle.display.clone(),
                    id,
                },
            })
            .collect())
    }

    pub fn item_count(&self) -> Result<usize> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        Ok(self.item_ids()?.len())
    }

    pub fn item(&self, index: usize) -> Result<TabItem> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        let ids = self.item_ids()?;
        let id = *ids
            .get(index)
            .ok_or(Error::InvalidArgument("tab index out of range"))?;
        Ok(TabItem {
            handle: WidgetHandle {
                display: self.handle.display.clone(),
                id,
            },
        })
    }

    pub fn index_of(&self, item: &TabItem) -> Result<Option<usize>> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        Ok(self.item_ids()?.iter().position(|id| *id == item.handle.id))
    }

    /// The selected tab index, or -1 when the folder is empty.
    pub fn selection_index(&self) -> Result<i32> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| Ok(data.selection))
    }

    /// Selects the tab at `index`, showing its control and hiding the
    /// previous one. Out-of-range indices are ignored.
    pub fn set_selection(&self, index: i32) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        let items = self.item_ids()?;
        if index < 0 || index as usize >= items.len() {
            return Ok(());
        }
        let previous = core.with_widget(self.handle.id, |data| {
            let previous = data.selection;
            data.selection = index;
            Ok(previous)
        })?;
        if previous == index {
            return Ok(());
        }
        if previous >= 0 {
            if let Some(&previous_item) = items.get(previous as usize) {
                self.show_item_control(previous_item, false)?;
            }
        }
        let selected = items[index as usize];
        self.show_item_control(selected, true)?;

        let mut event = Event::new(EventType::Selection);
        event.item = Some(
            TabItem {
                handle: WidgetHandle {
                    display: self.handle.display.clone(),
                    id: selected,
                },
            }
            .as_widget(),
        );
        self.notify_listeners(EventType::Selection, &mut event)?;
        Ok(())
    }

    fn show_item_control(&self, item: WidgetId, visible: bool) -> Result<()> {
        let core = self.handle.display.core();
        let control = core.with_widget(item, |data| Ok(data.item_control))?;
        if let Some(control_id) = control {
            if core.widget_exists(control_id) {
                let window = core.with_widget(control_id, |data| data.remote.window_object())?;
                crate::remote::api::window(&window)?.set_visible(visible)?;
            }
        }
        Ok(())
    }
}

impl sealed::HasHandle for TabFolder {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for TabFolder {}
impl Control for TabFolder {}
impl Container for TabFolder {}

impl TabItem {
    pub fn new(folder: &TabFolder, style: Style) -> Result<Self> {
        let display = folder.display().clone();
        display.core().check_widget(folder.id())?;
        let data = WidgetData::new(WidgetKind::TabItem, RemoteHandle::None, style);
        let id = display.core().register_widget(data, Some(folder.id()))?;
        // The first item becomes the selection.
        display.core().with_widget(folder.id(), |data| {
            if data.selection < 0 {
                data.selection = 0;
            }
            Ok(())
        })?;
        Ok(Self {
            handle: WidgetHandle { display, id },
        })
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| {
            data.text = text.to_owned();
            Ok(())
        })
    }

    pub fn text(&self) -> Result<String> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.with_widget(self.handle.id, |data| Ok(data.text.clone()))
    }

    /// Attaches the control this tab presents. The control must be a child
    /// of the item's folder.
    pub fn set_control(&self, control: &dyn Control) -> Result<()> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        core.check_widget(control.id())?;
        let folder = core
            .with_widget(self.handle.id, |data| Ok(data.parent))?
            .ok_or(Error::InvalidParent)?;
        let control_parent = core.with_widget(control.id(), |data| Ok(data.parent))?;
        if control_parent != Some(folder) {
            return Err(Error::InvalidParent);
        }
        core.with_widget(self.handle.id, |data| {
            data.item_control = Some(control.id());
            Ok(())
        })?;

        // Only the selected tab's control is visible.
        let folder_widget = TabFolder {
            handle: WidgetHandle {
                display: self.handle.display.clone(),
                id: folder,
            },
        };
        let selected = folder_widget.selection_index()?;
        let my_index = folder_widget.index_of(&Self {
            handle: self.handle.clone(),
        })?;
        let visible = selected >= 0 && my_index == Some(selected as usize);
        control.set_visible(visible)?;
        Ok(())
    }

    pub fn control(&self) -> Result<Option<crate::widgets::ControlRef>> {
        let core = self.handle.display.core();
        core.check_widget(self.handle.id)?;
        let control = core.with_widget(self.handle.id, |data| Ok(data.item_control))?;
        Ok(control.map(|id| crate::widgets::ControlRef {
            handle: WidgetHandle {
                display: self.handle.display.clone(),
                id,
            },
        }))
    }
}

impl sealed::HasHandle for TabItem {
    fn handle(&self) -> &WidgetHandle {
        &self.handle
    }
}

impl Widget for TabItem {}
