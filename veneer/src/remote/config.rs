// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed configurations for remote control models.
//!
//! Each remote model is configured through an untyped string-keyed property
//! bag. The structs here are the typed side of that boundary: one `apply`
//! function per control kind performs every bag write the construction
//! recipe needs, and nothing else in the crate touches property names.

use crate::core::Rect;
use crate::remote::api::{PropertySet, RemoteCallError};
use crate::remote::value::FontDescriptor;

/// Push-button semantics, matching the remote service's enumeration values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PushButtonType {
    #[default]
    Standard = 0,
    Ok = 1,
    Cancel = 2,
    Help = 3,
}

/// Model configuration for a button control.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonModelConfig {
    pub bounds: Rect,
    pub name: String,
    pub label: String,
    pub push_button_type: PushButtonType,
}

impl ButtonModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bounds: Rect::new(0, 0, 100, 50),
            name: name.into(),
            label: String::new(),
            push_button_type: PushButtonType::Standard,
        }
    }

    pub(crate) fn apply(&self, bag: &dyn PropertySet) -> Result<(), RemoteCallError> {
        apply_geometry(bag, self.bounds)?;
        bag.set_property_value("Name", self.name.as_str().into())?;
        bag.set_property_value(
            "PushButtonType",
            (self.push_button_type as i16).into(),
        )?;
        bag.set_property_value("Label", self.label.as_str().into())?;
        Ok(())
    }
}

/// Model configuration for a fixed-text (label) control.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTextModelConfig {
    pub bounds: Rect,
    pub name: String,
    pub label: String,
}

impl FixedTextModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bounds: Rect::new(0, 0, 100, 20),
            name: name.into(),
            label: String::new(),
        }
    }

    pub(crate) fn apply(&self, bag: &dyn PropertySet) -> Result<(), RemoteCallError> {
        apply_geometry(bag, self.bounds)?;
        bag.set_property_value("Name", self.name.as_str().into())?;
        bag.set_property_value("Label", self.label.as_str().into())?;
        Ok(())
    }
}

/// Model configuration for an edit (text field) control.
#[derive(Debug, Clone, PartialEq)]
pub struct EditModelConfig {
    pub bounds: Rect,
    pub name: String,
    pub font: Option<FontDescriptor>,
}

impl EditModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bounds: Rect::new(0, 0, 200, 80),
            name: name.into(),
            font: None,
        }
    }

    pub(crate) fn apply(&self, bag: &dyn PropertySet) -> Result<(), RemoteCallError> {
        apply_geometry(bag, self.bounds)?;
        bag.set_property_value("Name", self.name.as_str().into())?;
        if let Some(font) = &self.font {
            bag.set_property_value("FontDescriptor", font.clone().into())?;
        }
        Ok(())
    }
}

/// Model configuration for a progress-bar control.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBarModelConfig {
    pub bounds: Rect,
    pub name: String,
}

impl ProgressBarModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bounds: Rect::new(0, 0, 100, 50),
            name: name.into(),
        }
    }

    pub(crate) fn apply(&self, bag: &dyn PropertySet) -> Result<(), RemoteCallError> {
        apply_geometry(bag, self.bounds)?;
        bag.set_property_value("Name", self.name.as_str().into())?;
        Ok(())
    }
}

/// Model configuration for an image control.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageModelConfig {
    pub bounds: Rect,
    pub name: String,
    /// Border style; `1` is the service's simple border.
    pub border: i16,
    pub scale_image: bool,
    pub help_text: String,
}

impl ImageModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bounds: Rect::new(0, 0, 50, 50),
            name: name.into(),
            border: 1,
            scale_image: false,
            help_text: String::new(),
        }
    }

    pub(crate) fn apply(&self, bag: &dyn PropertySet) -> Result<(), RemoteCallError> {
        bag.set_property_value("Border", self.border.into())?;
        apply_geometry(bag, self.bounds)?;
        bag.set_property_value("Name", self.name.as_str().into())?;
        bag.set_property_value("ScaleImage", self.scale_image.into())?;
        bag.set_property_value("HelpText", self.help_text.as_str().into())?;
        Ok(())
    }
}

/// The four geometry properties shared by every control model.
fn apply_geometry(bag: &dyn PropertySet, bounds: Rect) -> Result<(), RemoteCallError> {
    bag.set_property_value("PositionX", bounds.x.into())?;
    bag.set_property_value("PositionY", bounds.y.into())?;
    bag.set_property_value("Width", bounds.width.into())?;
    bag.set_property_value("Height", bounds.height.into())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::remote::value::PropertyValue;

    /// Records every bag write in order.
    #[derive(Default)]
    struct RecordingBag {
        writes: Mutex<Vec<(String, PropertyValue)>>,
    }

    impl PropertySet for RecordingBag {
        fn set_property_value(
            &self,
            name: &str,
            value: PropertyValue,
        ) -> Result<(), RemoteCallError> {
            self.writes.lock().unwrap().push((name.to_owned(), value));
            Ok(())
        }

        fn property_value(&self, name: &str) -> Result<PropertyValue, RemoteCallError> {
            self.writes
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(written, _)| written == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| RemoteCallError::UnknownProperty(name.to_owned()))
        }
    }

    #[test]
    fn button_config_writes_the_documented_properties() {
        let bag = RecordingBag::default();
        let mut config = ButtonModelConfig::new("myButton");
        config.bounds = Rect::new(50, 50, 100, 50);
        config.label = "My Button".to_owned();
        config.apply(&bag).unwrap();

        let names: Vec<String> = bag
            .writes
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        assert_eq!(
            names,
            [
                "PositionX",
                "PositionY",
                "Width",
                "Height",
                "Name",
                "PushButtonType",
                "Label"
            ]
        );
        assert_eq!(
            bag.property_value("PushButtonType").unwrap(),
            PropertyValue::Int16(0)
        );
        assert_eq!(
            bag.property_value("Label").unwrap(),
            PropertyValue::Str("My Button".into())
        );
    }

    #[test]
    fn edit_config_writes_font_only_when_present() {
        let bag = RecordingBag::default();
        EditModelConfig::new("edit").apply(&bag).unwrap();
        assert!(bag.property_value("FontDescriptor").is_err());

        let bag = RecordingBag::default();
        let mut config = EditModelConfig::new("edit");
        config.font = Some(FontDescriptor::new("Arial", 14).bold());
        config.apply(&bag).unwrap();
        let font = bag.property_value("FontDescriptor").unwrap();
        assert_eq!(font.as_font().unwrap().name, "Arial");
    }
}
