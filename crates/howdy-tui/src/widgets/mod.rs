//! Chat surface widgets.

pub mod example_picker;
pub mod input_bar;
pub mod message_list;

pub use example_picker::ExamplePicker;
pub use input_bar::InputBar;
pub use message_list::MessageList;
