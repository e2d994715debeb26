pub mod crackers;
pub mod health;
pub mod orders;
