use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components follow the persistent state + transient wrapper pattern:
/// - Persistent state lives in the widget set for the whole session.
/// - A transient wrapper borrows that state plus the frame's props and
///   renders into a `Rect`.
///
/// # Mutability
///
/// `render` takes `&mut self` so components can update internal
/// presentation state (cursor clamps, scroll offsets) during the render
/// pass. This aligns with Ratatui's `StatefulWidget` pattern.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
