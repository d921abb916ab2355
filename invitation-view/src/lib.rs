//! Guest-facing side of the invitation: countdown, scroll reveal,
//! auto-scroll, the page reducer and the wish proxy client.

pub mod autoscroll;
pub mod client;
pub mod content;
pub mod countdown;
pub mod reveal;
pub mod view;
