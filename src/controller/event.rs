use crate::model::RecordId;

/// State-change notifications emitted by the controller so a rendering layer
/// can react without the controller knowing anything about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A load completed and the draft was replaced wholesale.
    DraftReplaced { id: RecordId },
    /// A single field was mutated by user input.
    DraftChanged { field: &'static str },
    OptionsLoaded { count: usize },
    /// The related-options fetch failed; the list stays empty.
    RelatedLoadFailed { detail: String },
    SaveStarted,
    /// A save was requested while another attempt was in flight and dropped.
    SaveSuppressed,
    SaveSucceeded { id: RecordId },
    SaveFailed { status: Option<u16> },
}

pub trait ControllerObserver {
    fn on_event(&self, event: &ControllerEvent);
}
