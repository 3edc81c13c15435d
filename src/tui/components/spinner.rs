//! Inline spinner. The event loop derives a frame counter from elapsed
//! time and passes it down; anything that wants a spinner glyph asks here.

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// The spinner glyph for a given animation tick.
pub fn frame(tick: usize) -> &'static str {
    FRAMES[tick % FRAMES.len()]
}
