pub mod character;
pub mod invite_code;
pub mod project;
pub mod research;
pub mod settlement;
pub mod treasury;
