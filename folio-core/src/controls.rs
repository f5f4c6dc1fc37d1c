/// A discrete viewer command from a button or key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    PreviousPage,
    NextPage,
    ZoomIn,
    ZoomOut,
    Close,
}

impl Control {
    /// Maps a key name (DOM `KeyboardEvent.key` spelling) to a control.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::PreviousPage),
            "ArrowRight" => Some(Self::NextPage),
            "+" | "=" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            "Escape" => Some(Self::Close),
            _ => None,
        }
    }
}
