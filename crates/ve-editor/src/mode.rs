//! The interaction mode.
//!
//! Focus, editing and resizing are mutually exclusive, so they live in one
//! enum rather than a set of independent flags. Hover is orthogonal and is
//! tracked separately by [`crate::hover::HoverTracker`].

use crate::focus::{EditSession, Focus};
use crate::resize::ResizeSession;
use ve_core::ElementId;

#[derive(Debug)]
pub enum InteractionMode<N> {
    Idle,
    Focused(Focus<N>),
    Editing {
        focus: Focus<N>,
        edit: EditSession<N>,
    },
    Resizing {
        focus: Focus<N>,
        session: ResizeSession,
    },
}

impl<N> Default for InteractionMode<N> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<N> InteractionMode<N> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Focused(_) => "focused",
            Self::Editing { .. } => "editing",
            Self::Resizing { .. } => "resizing",
        }
    }

    pub fn focus(&self) -> Option<&Focus<N>> {
        match self {
            Self::Idle => None,
            Self::Focused(focus) | Self::Editing { focus, .. } | Self::Resizing { focus, .. } => {
                Some(focus)
            }
        }
    }

    pub fn focused_id(&self) -> Option<ElementId> {
        self.focus().map(|f| f.id)
    }

    pub fn focused_element(&self) -> Option<&N> {
        self.focus().map(|f| &f.element)
    }

    pub fn edit(&self) -> Option<&EditSession<N>> {
        match self {
            Self::Editing { edit, .. } => Some(edit),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    /// Move out of the current mode, leaving `Idle` behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// `Focused` → `Resizing`. Any other mode is handed back unchanged; an
    /// edit must be finished by the caller first.
    pub fn into_resizing(self, session: ResizeSession) -> Result<Self, Self> {
        match self {
            Self::Focused(focus) => Ok(Self::Resizing { focus, session }),
            other => Err(other),
        }
    }

    /// `Resizing` → `Focused`, yielding the finished session.
    pub fn end_resizing(self) -> Result<(Focus<N>, ResizeSession), Self> {
        match self {
            Self::Resizing { focus, session } => Ok((focus, session)),
            other => Err(other),
        }
    }

    /// Split into the focus and the edit session, if any.
    pub fn into_parts(self) -> Option<(Focus<N>, Option<EditSession<N>>)> {
        match self {
            Self::Idle => None,
            Self::Focused(focus) | Self::Resizing { focus, .. } => Some((focus, None)),
            Self::Editing { focus, edit } => Some((focus, Some(edit))),
        }
    }
}
