pub mod buttons;
pub mod translator;

pub use buttons::ControllerButton;
pub use translator::{CommandTranslator, ConfigReport};
