// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Widget style bits and layout flags.

use bitflags::bitflags;

bitflags! {
    /// Style bits passed to widget constructors.
    ///
    /// Styles are hints; the remote backend has the last word on appearance.
    /// Unsupported bits are recorded but otherwise ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Style: u32 {
        const BORDER = 1 << 1;
        const H_SCROLL = 1 << 2;
        const V_SCROLL = 1 << 3;

        /// Push-button behavior.
        const PUSH = 1 << 4;

        const TITLE = 1 << 5;
        const CLOSE = 1 << 6;
        const MIN = 1 << 7;
        const MAX = 1 << 8;
        const RESIZE = 1 << 9;

        const SINGLE = 1 << 10;
        const MULTI = 1 << 11;
        const READ_ONLY = 1 << 12;

        const LEFT = 1 << 13;
        const CENTER = 1 << 14;
        const RIGHT = 1 << 15;

        const HORIZONTAL = 1 << 16;
        const VERTICAL = 1 << 17;

        const SMOOTH = 1 << 18;
        const INDETERMINATE = 1 << 19;
    }
}

impl Style {
    pub const NONE: Self = Self::empty();

    /// Trim for a typical top-level application shell.
    pub const SHELL_TRIM: Self = Self::CLOSE
        .union(Self::TITLE)
        .union(Self::MIN)
        .union(Self::MAX)
        .union(Self::RESIZE);

    /// Trim for a typical dialog shell.
    pub const DIALOG_TRIM: Self = Self::TITLE.union(Self::CLOSE).union(Self::BORDER);
}

bitflags! {
    /// Flags controlling a [`Container::layout_controls`] pass.
    ///
    /// [`Container::layout_controls`]: crate::widgets::Container::layout_controls
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayoutFlags: u32 {
        /// Cascade to all descendants instead of stopping at the receiver.
        const ALL = 1 << 0;
        /// Discard cached layout information.
        const CHANGED = 1 << 1;
        /// Defer the pass; it runs on the display's next tick.
        const DEFER = 1 << 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_trim_is_the_usual_decoration_set() {
        assert!(Style::SHELL_TRIM.contains(Style::CLOSE | Style::TITLE | Style::RESIZE));
        assert!(!Style::SHELL_TRIM.contains(Style::BORDER));
    }
}
