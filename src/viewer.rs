//! Modal viewer navigation.
//!
//! The index always refers to a position in the *filtered* list, so every
//! transition that depends on bounds takes the current filtered length.

/// State of the full-size viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Closed,
    Open(usize),
}

impl Viewer {
    pub fn is_open(&self) -> bool {
        matches!(self, Viewer::Open(_))
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Viewer::Open(i) => Some(*i),
            Viewer::Closed => None,
        }
    }

    /// Open at `index`; ignored when it is out of range.
    pub fn open(&mut self, index: usize, len: usize) {
        if index < len {
            *self = Viewer::Open(index);
        }
    }

    pub fn close(&mut self) {
        *self = Viewer::Closed;
    }

    pub fn prev(&mut self) {
        if let Viewer::Open(i) = self {
            *i = i.saturating_sub(1);
        }
    }

    pub fn next(&mut self, len: usize) {
        if let Viewer::Open(i) = self {
            *i = (*i + 1).min(len.saturating_sub(1));
        }
    }

    /// Close when the filtered list no longer reaches the open index.
    /// Returns true if the viewer was closed by this call.
    pub fn reconcile(&mut self, len: usize) -> bool {
        match *self {
            Viewer::Open(i) if len <= i => {
                *self = Viewer::Closed;
                true
            }
            _ => false,
        }
    }
}
