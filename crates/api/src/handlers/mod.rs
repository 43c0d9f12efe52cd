pub mod character;
pub mod health;
pub mod invite;
pub mod project;
pub mod research;
pub mod settlement;
pub mod treasury;
