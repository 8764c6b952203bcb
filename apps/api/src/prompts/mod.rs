pub mod facade;
pub mod handlers;
pub mod tenant;

pub use facade::PromptFacade;
